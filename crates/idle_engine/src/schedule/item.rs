use std::fmt;

pub const TURN_TOKEN: &str = "Turn";

/// One entry of an idle schedule. `Turn` is a zero-duration direction flip
/// and is never handed to the animation runtime.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScheduleItem {
    Clip(String),
    Turn,
}

impl ScheduleItem {
    pub fn clip(name: impl Into<String>) -> Self {
        Self::from_name(name)
    }

    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == TURN_TOKEN {
            Self::Turn
        } else {
            Self::Clip(name)
        }
    }

    pub fn is_turn(&self) -> bool {
        matches!(self, Self::Turn)
    }

    pub fn clip_name(&self) -> Option<&str> {
        match self {
            Self::Clip(name) => Some(name),
            Self::Turn => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Clip(name) => name,
            Self::Turn => TURN_TOKEN,
        }
    }
}

impl fmt::Display for ScheduleItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ScheduleItem {
    fn from(value: &str) -> Self {
        Self::from_name(value)
    }
}

pub fn items_from_names<I, S>(names: I) -> Vec<ScheduleItem>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(ScheduleItem::from_name).collect()
}
