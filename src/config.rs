use crate::theme::Theme;
use crate::tree::BONUS_ROLE;
use crate::zoom::Zoom;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry of the hierarchy chart, in layout units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub card_width: f32,
    pub card_height: f32,
    pub horizontal_gap: f32,
    pub vertical_gap: f32,
    pub padding: f32,
    pub min_canvas_width: f32,
    pub min_canvas_height: f32,
    pub bonus_role_label: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            card_width: 220.0,
            card_height: 90.0,
            horizontal_gap: 40.0,
            vertical_gap: 80.0,
            padding: 60.0,
            min_canvas_width: 800.0,
            min_canvas_height: 500.0,
            bonus_role_label: BONUS_ROLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Largest PNG width in pixels; bigger charts are scaled down to fit.
    pub width: f32,
    /// Largest PNG height in pixels.
    pub height: f32,
    pub background: String,
    pub empty_message: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
            empty_message: "No hierarchy data".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
    /// Scale a freshly built view starts at.
    pub zoom: Zoom,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::modern();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
            zoom: Zoom::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    card_fill: Option<String>,
    card_border: Option<String>,
    name_text_color: Option<String>,
    role_text_color: Option<String>,
    line_color: Option<String>,
    bonus_fill: Option<String>,
    bonus_border: Option<String>,
    bonus_line_color: Option<String>,
    badge_fill: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    card_width: Option<f32>,
    card_height: Option<f32>,
    horizontal_gap: Option<f32>,
    vertical_gap: Option<f32>,
    padding: Option<f32>,
    min_canvas_width: Option<f32>,
    min_canvas_height: Option<f32>,
    bonus_role_label: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    empty_message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
    zoom: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let parsed: ConfigFile = if is_json5(path) {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    apply_config_file(Config::default(), parsed)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    apply_config_file(Config::default(), parsed)
}

pub(crate) fn is_json5(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false)
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> anyhow::Result<Config> {
    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.card_fill {
            config.theme.card_fill = v;
        }
        if let Some(v) = vars.card_border {
            config.theme.card_border = v;
        }
        if let Some(v) = vars.name_text_color {
            config.theme.name_text_color = v;
        }
        if let Some(v) = vars.role_text_color {
            config.theme.role_text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.bonus_fill {
            config.theme.bonus_fill = v;
        }
        if let Some(v) = vars.bonus_border {
            config.theme.bonus_border = v;
        }
        if let Some(v) = vars.bonus_line_color {
            config.theme.bonus_line_color = v;
        }
        if let Some(v) = vars.badge_fill {
            config.theme.badge_fill = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.card_width {
            target.card_width = v;
        }
        if let Some(v) = layout.card_height {
            target.card_height = v;
        }
        if let Some(v) = layout.horizontal_gap {
            target.horizontal_gap = v;
        }
        if let Some(v) = layout.vertical_gap {
            target.vertical_gap = v;
        }
        if let Some(v) = layout.padding {
            target.padding = v;
        }
        if let Some(v) = layout.min_canvas_width {
            target.min_canvas_width = v;
        }
        if let Some(v) = layout.min_canvas_height {
            target.min_canvas_height = v;
        }
        if let Some(v) = layout.bonus_role_label {
            target.bonus_role_label = v;
        }
        if target.card_width <= 0.0 || target.card_height <= 0.0 {
            anyhow::bail!("card dimensions must be positive");
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.empty_message {
            config.render.empty_message = v;
        }
        if config.render.width <= 0.0 || config.render.height <= 0.0 {
            anyhow::bail!("render bounds must be positive");
        }
    }

    if let Some(scale) = parsed.zoom {
        config.zoom = Zoom::from_scale(scale);
    }

    Ok(config)
}
