use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Which slot an uploaded image fills. Decides geometry and crop strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageRole {
    /// Square avatar, cover-cropped to the exact box.
    Profile,
    /// Wide backdrop, contained in the box without upscaling.
    Background,
}

impl ImageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageRole::Profile => "profile",
            ImageRole::Background => "background",
        }
    }
}

impl Display for ImageRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
