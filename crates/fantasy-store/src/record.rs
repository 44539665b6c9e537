//! Record types for drivers, teams, races and session results
//!
//! Each record carries the fields the integrity rules inspect as typed
//! fields. Everything else a caller sends is kept verbatim in a flattened
//! [`Attributes`] map and written back unchanged.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Caller-owned fields of a record that the store does not interpret
pub type Attributes = serde_json::Map<String, Value>;

/// Store-assigned record identifier, unique within one collection
///
/// Zero means "not yet assigned"; every persisted record has a positive id.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    /// Placeholder carried by payloads before the store assigns an id
    pub const UNASSIGNED: RecordId = RecordId(0);

    /// Wrap a raw identifier
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw identifier value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Whether the store has assigned this id
    pub const fn is_assigned(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(RecordId)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A uniquely identified record stored in a collection
pub trait Record: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Record kind used in messages that are not tied to one collection
    const KIND: &'static str;

    /// Current identifier
    fn id(&self) -> RecordId;

    /// Overwrite the identifier
    fn set_id(&mut self, id: RecordId);
}

macro_rules! impl_record {
    ($($ty:ty => $kind:literal),+ $(,)?) => {
        $(
            impl Record for $ty {
                const KIND: &'static str = $kind;

                fn id(&self) -> RecordId {
                    self.id
                }

                fn set_id(&mut self, id: RecordId) {
                    self.id = id;
                }
            }
        )+
    };
}

/// A driver. Team affiliation lives on [`Team::driver_ids`], never here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Driver {
    /// Identifier
    #[serde(default)]
    pub id: RecordId,
    /// Name, constructor, number and any other caller fields
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Driver {
    /// Create an unassigned driver with a name
    pub fn named(name: impl Into<String>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), Value::String(name.into()));
        Self {
            id: RecordId::UNASSIGNED,
            attributes,
        }
    }

    /// Driver name, if the payload carried one
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    /// Constructor the driver races for. Drivers sharing a constructor are
    /// teammates for scoring.
    pub fn constructor(&self) -> Option<&str> {
        self.attributes.get("constructor").and_then(Value::as_str)
    }
}

/// A fantasy team and its ordered driver roster
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Team {
    /// Identifier
    #[serde(default)]
    pub id: RecordId,
    /// Roster, in pick order
    #[serde(default)]
    pub driver_ids: Vec<RecordId>,
    /// Name, owner and any other caller fields
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Team {
    /// Create an unassigned team with a name and roster
    pub fn named(name: impl Into<String>, driver_ids: Vec<RecordId>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), Value::String(name.into()));
        Self {
            id: RecordId::UNASSIGNED,
            driver_ids,
            attributes,
        }
    }

    /// Team name, if the payload carried one
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    /// Whether the driver is on this roster
    pub fn has_driver(&self, driver_id: RecordId) -> bool {
        self.driver_ids.contains(&driver_id)
    }

    /// Replace every roster slot holding `current` with `replacement`.
    ///
    /// Returns the number of slots replaced.
    pub fn replace_driver(&mut self, current: RecordId, replacement: RecordId) -> usize {
        let mut replaced = 0;
        for slot in self.driver_ids.iter_mut().filter(|slot| **slot == current) {
            *slot = replacement;
            replaced += 1;
        }
        replaced
    }
}

/// A race weekend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Race {
    /// Identifier
    #[serde(default)]
    pub id: RecordId,
    /// Name, date, track and any other caller fields
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Race {
    /// Create an unassigned race with a name
    pub fn named(name: impl Into<String>) -> Self {
        let mut attributes = Attributes::new();
        attributes.insert("name".to_string(), Value::String(name.into()));
        Self {
            id: RecordId::UNASSIGNED,
            attributes,
        }
    }
}

/// One driver's outcome in one session of one race
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionResult {
    /// Identifier
    #[serde(default)]
    pub id: RecordId,
    /// Race this result belongs to
    pub race_id: RecordId,
    /// Driver this result belongs to
    pub driver_id: RecordId,
    /// Position, fastest lap, finished flag and any other caller fields
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl SessionResult {
    /// Create an unassigned result for a driver in a race
    pub fn new(race_id: RecordId, driver_id: RecordId) -> Self {
        Self {
            id: RecordId::UNASSIGNED,
            race_id,
            driver_id,
            attributes: Attributes::new(),
        }
    }

    /// Set a caller attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Finishing or grid position, 1-based
    pub fn position(&self) -> Option<u32> {
        self.attributes
            .get("position")
            .and_then(Value::as_u64)
            .and_then(|p| u32::try_from(p).ok())
    }

    /// Whether the driver set the fastest lap
    pub fn fastest_lap(&self) -> bool {
        self.attributes
            .get("fastest_lap")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Finished flag; absent means the session did not record it
    pub fn finished(&self) -> Option<bool> {
        self.attributes.get("finished").and_then(Value::as_bool)
    }

    /// The (race, driver) pair that must be unique within a category
    pub fn key(&self) -> (RecordId, RecordId) {
        (self.race_id, self.driver_id)
    }
}

impl_record!(Driver => "Driver", Team => "Team", Race => "Race", SessionResult => "Result");

/// The four independent result collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResultCategory {
    /// Grand prix
    Race,
    /// Sprint race
    Sprint,
    /// Grand prix qualifying
    Qualifying,
    /// Sprint qualifying (shootout)
    SprintQualifying,
}

impl ResultCategory {
    /// Every category, in persistence order
    pub const ALL: [ResultCategory; 4] = [
        ResultCategory::Race,
        ResultCategory::Sprint,
        ResultCategory::Qualifying,
        ResultCategory::SprintQualifying,
    ];

    /// Lowercase label used in messages
    pub fn label(self) -> &'static str {
        match self {
            ResultCategory::Race => "race",
            ResultCategory::Sprint => "sprint",
            ResultCategory::Qualifying => "qualifying",
            ResultCategory::SprintQualifying => "sprint qualifying",
        }
    }

    /// Record kind used in not-found messages
    pub fn kind(self) -> &'static str {
        match self {
            ResultCategory::Race => "Race result",
            ResultCategory::Sprint => "Sprint result",
            ResultCategory::Qualifying => "Qualifying result",
            ResultCategory::SprintQualifying => "Sprint qualifying result",
        }
    }

    /// Slug used on the command line
    pub fn slug(self) -> &'static str {
        match self {
            ResultCategory::Race => "race",
            ResultCategory::Sprint => "sprint",
            ResultCategory::Qualifying => "qualifying",
            ResultCategory::SprintQualifying => "sprint-qualifying",
        }
    }
}

impl fmt::Display for ResultCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ResultCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "race" => Ok(ResultCategory::Race),
            "sprint" => Ok(ResultCategory::Sprint),
            "qualifying" => Ok(ResultCategory::Qualifying),
            "sprint-qualifying" => Ok(ResultCategory::SprintQualifying),
            other => Err(format!("unknown result category: {other}")),
        }
    }
}

impl Serialize for ResultCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}
