//! Prompt for the dictionary-style word explanation.
//!
//! The system message pins the output to a fixed template (headword line,
//! `例句:` marker, example, translation, inflections, mnemonic). The
//! [`crate::extract`] module relies on the first line and the marker line.

/// Marker line preceding the example sentence in the template.
pub const EXAMPLE_MARKER: &str = "例句:";

/// System instruction plus the one-shot `quit` sample.
pub const SYSTEM_PROMPT: &str = "\
你是一个英语词典助手。请严格按照以下示例格式提供单词解释：

quit [kwɪt] v.停止；放弃；离开；辞职;
例句:
She decided to quit her job and travel the world.
例句翻译
她决定辞去工作，去环游世界。
变形:quits, quitting, quit
记忆技巧:将quit与中文'退出'联系起来记忆，两者发音和含义相近，都表示离开或放弃。";

/// User message asking for `word` in the template above.
pub fn user_message(word: &str) -> String {
    format!(
        "请解释单词 '{word}'，严格按照示例格式回复，包括单词解释、例句、例句翻译、变形和记忆技巧。\
         记忆技巧应该简短实用，可以包括词根分析、谐音联想、图像记忆法等，让人更容易记住该单词。"
    )
}
