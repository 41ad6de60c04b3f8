use std::fmt;

use crate::controllers::PostStatsController;
use crate::entities::{PostId, UserId};

/// where the widget is rendered. profile pages lay it out full width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Feed,
    Profile,
}

impl Surface {
    pub fn from_path(path: &str) -> Self {
        match path.starts_with("/profile") {
            true => Self::Profile,
            false => Self::Feed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeIcon {
    Liked,
    Like,
    /// a save or unsave is in flight; takes the like icon's place.
    Loader,
}

impl LikeIcon {
    pub fn asset(self) -> Option<&'static str> {
        match self {
            Self::Liked => Some("/assets/icons/liked.svg"),
            Self::Like => Some("/assets/icons/like.svg"),
            Self::Loader => None,
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            Self::Liked => "♥",
            Self::Like => "♡",
            Self::Loader => "…",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIcon {
    Saved,
    Save,
}

impl SaveIcon {
    pub fn asset(self) -> &'static str {
        match self {
            Self::Saved => "/assets/icons/saved.svg",
            Self::Save => "/assets/icons/save.svg",
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            Self::Saved => "■ saved",
            Self::Save => "□ save",
        }
    }
}

/// display values of one widget for one viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsView {
    pub post_id: PostId,
    pub like_icon: LikeIcon,
    pub like_count: usize,
    pub save_icon: SaveIcon,
    pub surface: Surface,
}

impl StatsView {
    pub fn of(c: &PostStatsController, viewer: &UserId, surface: Surface) -> Self {
        let like_icon = match (c.is_busy(), c.is_liked_by(viewer)) {
            (true, _) => LikeIcon::Loader,
            (false, true) => LikeIcon::Liked,
            (false, false) => LikeIcon::Like,
        };
        let save_icon = match c.is_saved() {
            true => SaveIcon::Saved,
            false => SaveIcon::Save,
        };

        Self {
            post_id: c.post_id().clone(),
            like_icon,
            like_count: c.like_count(),
            save_icon,
            surface,
        }
    }
}

impl fmt::Display for StatsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let likes = format!("{} {}", self.like_icon.glyph(), self.like_count);
        let width = match self.surface {
            Surface::Profile => 32,
            Surface::Feed => 0,
        };

        write!(
            f,
            "[{}] {:<w$} {}",
            self.post_id,
            likes,
            self.save_icon.glyph(),
            w = width
        )
    }
}
