//! Theme Engine: light/dark shell palettes and the page overrides pushed into
//! the active document.

use std::collections::BTreeMap;

use crate::types::settings::ThemeMode;

/// Trait defining the theme engine interface.
pub trait ThemeEngineTrait {
    fn set_theme(&mut self, mode: ThemeMode) -> AppliedTheme;
    fn get_theme(&self) -> ThemeMode;
    fn get_css_variables(&self) -> BTreeMap<String, String>;
    fn stylesheet(&self) -> String;
    fn page_script(&self) -> &'static str;
}

/// What applying a theme produces: the shell stylesheet and the script to
/// inject into the active page. Injection is best-effort.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedTheme {
    pub mode: ThemeMode,
    pub stylesheet: String,
    pub page_script: &'static str,
}

struct DarkPalette;
impl DarkPalette {
    const WINDOW_BG: &'static str = "#2c2c2c";
    const TEXT: &'static str = "white";
    const INPUT_BG: &'static str = "#4d4d4d";
    const INPUT_BORDER: &'static str = "#666";
    const BUTTON_BG: &'static str = "#5c5c5c";
    const TABS_BG: &'static str = "#3c3c3c";
}

struct LightPalette;
impl LightPalette {
    const WINDOW_BG: &'static str = "white";
    const TEXT: &'static str = "black";
    const INPUT_BG: &'static str = "#f0f0f0";
    const INPUT_BORDER: &'static str = "#ccc";
    const BUTTON_BG: &'static str = "#e0e0e0";
    const TABS_BG: &'static str = "#f7f7f7";
}

const DARK_PAGE_SCRIPT: &str = r#"(function(){
  var root=document.documentElement;
  if(!root)return;
  root.style.backgroundColor='#2c2c2c';
  root.style.color='white';
  var ntp=document.querySelector('body.ntp');
  if(ntp){ntp.style.backgroundColor='#2c2c2c';ntp.style.color='white';}
})();"#;

const LIGHT_PAGE_SCRIPT: &str = r#"(function(){
  var root=document.documentElement;
  if(!root)return;
  root.style.backgroundColor='';
  root.style.color='';
  var ntp=document.querySelector('body.ntp');
  if(ntp){ntp.style.backgroundColor='';ntp.style.color='';}
})();"#;

/// The theme engine implementation.
pub struct ThemeEngine {
    current_theme: ThemeMode,
}

impl ThemeEngine {
    pub fn new(mode: ThemeMode) -> Self {
        Self { current_theme: mode }
    }

    fn build_variables(
        window_bg: &str,
        text: &str,
        input_bg: &str,
        input_border: &str,
        button_bg: &str,
        tabs_bg: &str,
    ) -> BTreeMap<String, String> {
        let mut vars = BTreeMap::new();
        vars.insert("--window-bg".into(), window_bg.into());
        vars.insert("--text-color".into(), text.into());
        vars.insert("--input-bg".into(), input_bg.into());
        vars.insert("--input-border".into(), input_border.into());
        vars.insert("--button-bg".into(), button_bg.into());
        vars.insert("--tabs-bg".into(), tabs_bg.into());
        vars.insert("--button-radius".into(), "5px".into());
        vars
    }
}

impl Default for ThemeEngine {
    fn default() -> Self {
        Self::new(ThemeMode::Light)
    }
}

impl ThemeEngineTrait for ThemeEngine {
    fn set_theme(&mut self, mode: ThemeMode) -> AppliedTheme {
        self.current_theme = mode;
        AppliedTheme {
            mode,
            stylesheet: self.stylesheet(),
            page_script: self.page_script(),
        }
    }

    fn get_theme(&self) -> ThemeMode {
        self.current_theme
    }

    fn get_css_variables(&self) -> BTreeMap<String, String> {
        match self.current_theme {
            ThemeMode::Dark => Self::build_variables(
                DarkPalette::WINDOW_BG,
                DarkPalette::TEXT,
                DarkPalette::INPUT_BG,
                DarkPalette::INPUT_BORDER,
                DarkPalette::BUTTON_BG,
                DarkPalette::TABS_BG,
            ),
            ThemeMode::Light => Self::build_variables(
                LightPalette::WINDOW_BG,
                LightPalette::TEXT,
                LightPalette::INPUT_BG,
                LightPalette::INPUT_BORDER,
                LightPalette::BUTTON_BG,
                LightPalette::TABS_BG,
            ),
        }
    }

    /// A `:root { ... }` block with every variable, ready for the shell chrome.
    fn stylesheet(&self) -> String {
        let body: String = self
            .get_css_variables()
            .iter()
            .map(|(k, v)| format!("{}:{};", k, v))
            .collect();
        format!(":root{{{}}}", body)
    }

    fn page_script(&self) -> &'static str {
        match self.current_theme {
            ThemeMode::Dark => DARK_PAGE_SCRIPT,
            ThemeMode::Light => LIGHT_PAGE_SCRIPT,
        }
    }
}
