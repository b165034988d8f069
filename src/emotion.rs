//! Emotion labels and the classification prompts sent to the provider.

use crate::config::PromptStyle;
use std::fmt;

/// Label returned when the provider gives no usable text.
pub const UNKNOWN_LABEL: &str = "不明";

const TERSE_PROMPT: &str = "この人物の表情を「笑っている」「怒っている」「泣いている」「普通の状態」の4つのうち、最も近いもの1つだけで答えてください。もし判断できない場合は「不明」と答えてください。余計な解説は不要です。回答は必ず指定した単語のみにしてください。";

const VERBOSE_PROMPT: &str = "\
あなたは人物の表情を分類するアシスタントです。画像に写っている人物の表情を観察し、次の4つの分類のうち最も近いもの1つを選んでください。

- 「笑っている」: 口角が上がっている、歯が見えている、目が細くなっているなど、笑顔や喜びが見られる状態
- 「怒っている」: 眉間にしわが寄っている、眉が下がっている、口を強く結んでいるなど、怒りや不満が見られる状態
- 「泣いている」: 涙が見える、目が赤い、口元がゆがんでいるなど、悲しみや泣いている様子が見られる状態
- 「普通の状態」: 上記のいずれにも当てはまらない、落ち着いた無表情に近い状態

人物が写っていない、顔が判別できないなど判断できない場合は「不明」と答えてください。

回答のルール:
1. 「笑っている」「怒っている」「泣いている」「普通の状態」「不明」のいずれか1つの単語のみを出力すること
2. 説明、理由、句読点、記号、改行は一切付けないこと";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Laughing,
    Angry,
    Crying,
    Neutral,
    Unknown,
}

impl Emotion {
    pub const ALL: [Emotion; 5] = [
        Emotion::Laughing,
        Emotion::Angry,
        Emotion::Crying,
        Emotion::Neutral,
        Emotion::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Laughing => "笑っている",
            Self::Angry => "怒っている",
            Self::Crying => "泣いている",
            Self::Neutral => "普通の状態",
            Self::Unknown => UNKNOWN_LABEL,
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|emotion| emotion.label() == label)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn prompt(style: PromptStyle) -> &'static str {
    match style {
        PromptStyle::Terse => TERSE_PROMPT,
        PromptStyle::Verbose => VERBOSE_PROMPT,
    }
}

/// Trims the provider reply, falling back to [`UNKNOWN_LABEL`] when it is
/// absent or blank. Replies outside the label set are kept as-is.
pub fn label_from_reply(reply: Option<&str>) -> String {
    reply
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(UNKNOWN_LABEL)
        .to_string()
}
