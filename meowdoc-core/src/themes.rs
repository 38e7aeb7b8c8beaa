use serde::{Deserialize, Serialize};

/// Themes meowdoc knows how to select in `mkdocs.yml`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// MkDocs' built-in theme.
    Default,
    Dracula,
    #[default]
    Material,
}

impl Theme {
    /// Value for `theme.name` in the site configuration.
    pub fn mkdocs_name(self) -> &'static str {
        match self {
            Theme::Default => "",
            Theme::Dracula => "dracula",
            Theme::Material => "material",
        }
    }

    /// Python package providing the theme, if it is not built in.
    pub fn package_name(self) -> Option<&'static str> {
        match self {
            Theme::Default => None,
            Theme::Dracula => Some("mkdocs-dracula-theme"),
            Theme::Material => Some("mkdocs-material"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "mkdocs" => Ok(Theme::Default),
            "dracula" => Ok(Theme::Dracula),
            "material" => Ok(Theme::Material),
            other => Err(format!("unknown theme '{other}' (expected default, dracula or material)")),
        }
    }
}
