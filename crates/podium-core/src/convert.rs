// ── Wire-to-domain conversions ──
//
// podium-api exposes raw response shapes; consumers only ever see the
// domain types in `model`. Unknown slide kinds degrade to `Standard`
// rather than failing the fetch.

use podium_api::slides::{SlideResponse, TalkInfoResponse};

use crate::model::{Slide, SlideId, SlideKind, TalkInfo};

impl From<TalkInfoResponse> for TalkInfo {
    fn from(raw: TalkInfoResponse) -> Self {
        Self {
            title: raw.title,
            date: raw.date,
            slide_ids: raw.slide_ids.into_iter().map(SlideId::new).collect(),
        }
    }
}

impl From<SlideResponse> for Slide {
    fn from(raw: SlideResponse) -> Self {
        Self {
            id: SlideId::new(raw.id),
            title: raw.title,
            body: raw.body,
            kind: parse_kind(raw.kind.as_deref()),
            style: raw.style,
            notes: raw.notes,
        }
    }
}

fn parse_kind(kind: Option<&str>) -> SlideKind {
    match kind {
        Some("Cover") => SlideKind::Cover,
        Some("Part") => SlideKind::Part,
        Some("Standard") | None => SlideKind::Standard,
        Some(other) => {
            tracing::debug!(kind = other, "unknown slide kind, treating as Standard");
            SlideKind::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn talk_info_converts_ids_in_order() {
        let raw = TalkInfoResponse {
            title: "T".into(),
            date: "2026-08-23".into(),
            slide_ids: vec!["a".into(), "b".into()],
        };

        let talk = TalkInfo::from(raw);
        assert_eq!(talk.slide_ids, vec![SlideId::new("a"), SlideId::new("b")]);
    }

    #[test]
    fn unknown_kind_degrades_to_standard() {
        let raw = SlideResponse {
            id: "x".into(),
            title: "X".into(),
            body: String::new(),
            kind: Some("Hologram".into()),
            style: Vec::new(),
            notes: None,
        };

        assert_eq!(Slide::from(raw).kind, SlideKind::Standard);
    }

    #[test]
    fn cover_kind_is_preserved() {
        let raw = SlideResponse {
            id: "c".into(),
            title: "C".into(),
            body: String::new(),
            kind: Some("Cover".into()),
            style: vec!["big".into()],
            notes: Some("smile".into()),
        };

        let slide = Slide::from(raw);
        assert_eq!(slide.kind, SlideKind::Cover);
        assert_eq!(slide.style, vec!["big"]);
        assert_eq!(slide.notes.as_deref(), Some("smile"));
    }
}
