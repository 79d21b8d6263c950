use super::*;
use std::path::PathBuf;

fn clip() -> AudioLocator {
    AudioLocator::File(PathBuf::from("narration.mp3"))
}

#[test]
fn extracts_direct_json() {
    let reply = "  {\"title\": \"A\"}  ";
    assert_eq!(extract_json_block(reply).unwrap(), "{\"title\": \"A\"}");
}

#[test]
fn extracts_fenced_json() {
    let reply = "Here you go:\n```json\n{\"title\": \"Cells\"}\n```\nEnjoy!";
    assert_eq!(extract_json_block(reply).unwrap(), "{\"title\": \"Cells\"}");
}

#[test]
fn skips_non_json_fences() {
    let reply = "```python\nprint(1)\n```\n```\n[1, 2]\n```";
    assert_eq!(extract_json_block(reply).unwrap(), "[1, 2]");
}

#[test]
fn prose_is_an_upstream_parse_error() {
    let err = extract_json_block("Plants are green.").unwrap_err();
    assert!(matches!(err, ReelError::UpstreamParse(_)));
}

#[test]
fn from_reply_reads_summary_fields() {
    let reply = r#"```json
{"title": "Photosynthesis", "summary": "Light to sugar.", "keyPoints": ["Light"], "difficulty": "Tertiary"}
```"#;
    let content = PresentationContent::from_reply(reply, clip()).unwrap();
    assert_eq!(content.title, "Photosynthesis");
    assert_eq!(content.key_points, vec!["Light".to_string()]);
    assert_eq!(content.difficulty, Difficulty::Tertiary);
    assert_eq!(content.audio, clip());
}

#[test]
fn from_reply_falls_back_to_plain_narration() {
    let content = PresentationContent::from_reply("Cells divide by mitosis.", clip()).unwrap();
    assert_eq!(content.title, FALLBACK_TITLE);
    assert_eq!(content.summary, "Cells divide by mitosis.");
    assert!(content.key_points.is_empty());
    assert_eq!(content.difficulty, Difficulty::General);
}

#[test]
fn from_reply_rejects_wrong_shape() {
    let err = PresentationContent::from_reply("{\"answer\": 42}", clip()).unwrap_err();
    assert!(matches!(err, ReelError::UpstreamParse(_)));
}
