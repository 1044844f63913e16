use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::note::{Note, NotePlacement, Notes};
use super::record::{Cascade, Record, RecordId};

/// The five fixed mood levels, stored by their numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MoodLevel {
    Bad = 1,
    Poor = 2,
    Neutral = 3,
    Good = 4,
    Excellent = 5,
}

impl MoodLevel {
    /// Highest first, as offered to the user.
    pub const ALL: [MoodLevel; 5] = [
        MoodLevel::Excellent,
        MoodLevel::Good,
        MoodLevel::Neutral,
        MoodLevel::Poor,
        MoodLevel::Bad,
    ];

    pub fn id(&self) -> u8 {
        *self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Bad),
            2 => Some(Self::Poor),
            3 => Some(Self::Neutral),
            4 => Some(Self::Good),
            5 => Some(Self::Excellent),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Neutral => "Neutral",
            Self::Poor => "Poor",
            Self::Bad => "Bad",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Excellent => "😃",
            Self::Good => "🙂",
            Self::Neutral => "😐",
            Self::Poor => "🙁",
            Self::Bad => "😞",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Self::Excellent => "green",
            Self::Good => "blue",
            Self::Neutral => "yellow",
            Self::Poor => "orange",
            Self::Bad => "red",
        }
    }
}

impl TryFrom<u8> for MoodLevel {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| format!("mood level out of range: {}", id))
    }
}

impl From<MoodLevel> for u8 {
    fn from(level: MoodLevel) -> u8 {
        level.id()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MoodFilter {
    #[default]
    All,
    Only(MoodLevel),
}

impl MoodFilter {
    pub fn matches(&self, entry: &MoodEntry) -> bool {
        match self {
            Self::All => true,
            Self::Only(level) => entry.mood == *level,
        }
    }

    /// Parses `all` or a level id `1`..`5`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Some(Self::All);
        }
        s.parse::<u8>().ok().and_then(MoodLevel::from_id).map(Self::Only)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodEntry {
    #[serde(skip)]
    pub id: RecordId,
    pub mood: MoodLevel,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl MoodEntry {
    pub fn new(mood: MoodLevel) -> Self {
        Self {
            id: RecordId::new(),
            mood,
            created_at: Utc::now(),
            notes: Vec::new(),
        }
    }
}

impl Record for MoodEntry {
    const COLLECTION: &'static str = "moods";
    const ORDER_FIELD: &'static str = "createdAt";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn cascade(&self) -> Cascade {
        Cascade {
            notes: self.notes.iter().map(|n| n.id).collect(),
            ..Cascade::default()
        }
    }
}

impl Notes for MoodEntry {
    const NOTE_PLACEMENT: NotePlacement = NotePlacement::OldestFirst;

    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn notes_mut(&mut self) -> &mut Vec<Note> {
        &mut self.notes
    }
}

/// Entries matching `filter`, newest first.
pub fn filter_entries(entries: &[MoodEntry], filter: MoodFilter) -> Vec<MoodEntry> {
    let mut out: Vec<MoodEntry> = entries.iter().filter(|e| filter.matches(e)).cloned().collect();
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn level_serializes_as_id() {
        assert_eq!(serde_json::to_string(&MoodLevel::Good).unwrap(), "4");
        let back: MoodLevel = serde_json::from_str("1").unwrap();
        assert_eq!(back, MoodLevel::Bad);
        assert!(serde_json::from_str::<MoodLevel>("9").is_err());
    }

    #[test]
    fn filter_parsing() {
        assert_eq!(MoodFilter::parse("all"), Some(MoodFilter::All));
        assert_eq!(MoodFilter::parse("5"), Some(MoodFilter::Only(MoodLevel::Excellent)));
        assert_eq!(MoodFilter::parse("0"), None);
    }

    #[test]
    fn filtered_view_is_newest_first() {
        let mut old = MoodEntry::new(MoodLevel::Good);
        old.created_at -= Duration::hours(2);
        let bad = MoodEntry::new(MoodLevel::Bad);
        let mut newest = MoodEntry::new(MoodLevel::Good);
        newest.created_at += Duration::hours(1);
        let entries = vec![old.clone(), bad, newest.clone()];

        let good = filter_entries(&entries, MoodFilter::Only(MoodLevel::Good));
        assert_eq!(good, vec![newest, old]);
        assert_eq!(filter_entries(&entries, MoodFilter::All).len(), 3);
    }

    #[test]
    fn notes_append() {
        let mut e = MoodEntry::new(MoodLevel::Neutral);
        e.add_note("first");
        e.add_note("second");
        assert_eq!(e.notes[0].text, "first");
        assert_eq!(e.notes[1].text, "second");
    }
}
