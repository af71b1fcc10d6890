// src/content/models.rs

use serde::{Deserialize, Serialize};

/// The content collections this site serves. Every one goes through the
/// same proxy contract; only the upstream collection name differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Blogs,
    Tools,
    Videos,
    Writeups,
}

impl ResourceKind {
    /// Parse a path segment into a known collection.
    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "blogs" => Some(Self::Blogs),
            "tools" => Some(Self::Tools),
            "videos" => Some(Self::Videos),
            "writeups" => Some(Self::Writeups),
            _ => None,
        }
    }

    /// Upstream collection name.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::Tools => "tools",
            Self::Videos => "videos",
            Self::Writeups => "writeups",
        }
    }

    /// Singular noun used in user-facing messages.
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Blogs => "Blog",
            Self::Tools => "Tool",
            Self::Videos => "Video",
            Self::Writeups => "Writeup",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}
