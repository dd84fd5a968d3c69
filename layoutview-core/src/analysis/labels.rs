use image::Rgba;

use crate::consts::LABEL_ALPHA;

/// The closed set of entity types that get their own color.
///
/// Every other type string maps to [`Label::Other`] and shares its gray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Header,
    Question,
    Answer,
    Other,
}

impl Label {
    pub fn from_type(entity_type: &str) -> Self {
        match entity_type {
            "header" => Label::Header,
            "question" => Label::Question,
            "answer" => Label::Answer,
            _ => Label::Other,
        }
    }

    pub const fn name(&self) -> &str {
        match self {
            Label::Header => "header",
            Label::Question => "question",
            Label::Answer => "answer",
            Label::Other => "other",
        }
    }

    /// RGBA color shared by the overlay strokes, label tags and browser badges.
    pub const fn color(&self) -> [u8; 4] {
        match self {
            Label::Header => [25, 118, 210, LABEL_ALPHA],   // Blue
            Label::Question => [220, 0, 78, LABEL_ALPHA],   // Pink
            Label::Answer => [56, 142, 60, LABEL_ALPHA],    // Green
            Label::Other => [158, 158, 158, LABEL_ALPHA],   // Gray
        }
    }
}

/// Color for an entity type string.
pub fn color_for(entity_type: &str) -> Rgba<u8> {
    Rgba(Label::from_type(entity_type).color())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_colors_are_fixed() {
        assert_eq!(color_for("header"), Rgba([25, 118, 210, 128]));
        assert_eq!(color_for("question"), Rgba([220, 0, 78, 128]));
        assert_eq!(color_for("answer"), Rgba([56, 142, 60, 128]));
    }

    #[test]
    fn test_unknown_types_share_gray() {
        let gray = Rgba([158, 158, 158, 128]);
        for entity_type in ["other", "table", "", "Header", "footer"] {
            assert_eq!(color_for(entity_type), gray);
            assert_eq!(color_for(entity_type), color_for(entity_type));
        }
    }

    #[test]
    fn test_known_colors_are_distinct() {
        let colors = [Label::Header, Label::Question, Label::Answer, Label::Other]
            .map(|label| label.color());
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_label_round_trip_name() {
        for label in [Label::Header, Label::Question, Label::Answer] {
            assert_eq!(Label::from_type(label.name()), label);
        }
    }
}
