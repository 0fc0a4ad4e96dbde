use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

/// Toolbar buttons. Toggling only changes highlight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTool {
    Bold,
    Italic,
    Heading,
    BulletList,
    NumberedList,
}

impl FormatTool {
    pub const ALL: [FormatTool; 5] = [
        FormatTool::Bold,
        FormatTool::Italic,
        FormatTool::Heading,
        FormatTool::BulletList,
        FormatTool::NumberedList,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FormatTool::Bold => "bold",
            FormatTool::Italic => "italic",
            FormatTool::Heading => "heading",
            FormatTool::BulletList => "bullet-list",
            FormatTool::NumberedList => "numbered-list",
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl fmt::Display for FormatTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormatTool {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        FormatTool::ALL
            .into_iter()
            .find(|tool| tool.name() == s)
            .ok_or_else(|| anyhow!("unknown tool {:?}", s))
    }
}

/// Set of highlighted toolbar tools.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ToolSet(u8);

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `tool` and returns whether it is now active.
    pub fn toggle(&mut self, tool: FormatTool) -> bool {
        self.0 ^= tool.bit();
        self.is_active(tool)
    }

    pub fn is_active(&self, tool: FormatTool) -> bool {
        self.0 & tool.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = FormatTool> + '_ {
        FormatTool::ALL.into_iter().filter(|tool| self.is_active(*tool))
    }
}
