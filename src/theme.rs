use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub card_fill: String,
    pub card_border: String,
    pub name_text_color: String,
    pub role_text_color: String,
    pub line_color: String,
    pub bonus_fill: String,
    pub bonus_border: String,
    pub bonus_line_color: String,
    pub badge_fill: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            font_size: 14.0,
            card_fill: "#ECECFF".to_string(),
            card_border: "#9370DB".to_string(),
            name_text_color: "#333333".to_string(),
            role_text_color: "#666666".to_string(),
            line_color: "#333333".to_string(),
            bonus_fill: "#FFFFDE".to_string(),
            bonus_border: "#AAAA33".to_string(),
            bonus_line_color: "#AAAA33".to_string(),
            badge_fill: "#9370DB".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            card_fill: "#F8FAFF".to_string(),
            card_border: "#C7D2E5".to_string(),
            name_text_color: "#1C2430".to_string(),
            role_text_color: "#5B6B85".to_string(),
            line_color: "#7A8AA6".to_string(),
            bonus_fill: "#FFF7E6".to_string(),
            bonus_border: "#F0B44C".to_string(),
            bonus_line_color: "#E39B1B".to_string(),
            badge_fill: "#4F6BED".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "modern" => Some(Self::modern()),
            "classic" | "default" | "base" => Some(Self::classic()),
            _ => None,
        }
    }
}
