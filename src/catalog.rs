//! Level catalog
//!
//! An ordered, immutable list of element configurations. Each level lists its
//! slots relative to the arena center, grouped into shells by radius. The
//! catalog is validated once at construction so the simulation can assume
//! well-formed data.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::sim::ParticleKind;

/// Slots whose shell radii differ by less than this share a shell
pub const SHELL_TOLERANCE: f32 = 0.5;

/// One capture slot as authored in level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    /// Position relative to the arena center
    pub offset: Vec2,
    /// Radius band identifying the shell
    pub shell_radius: f32,
    pub kind: ParticleKind,
    /// Nominal full angular width of the entry opening (radians)
    pub gap: f32,
    /// Gap rotation speed (radians/sec)
    pub angular_speed: f32,
}

impl SlotDefinition {
    pub fn new(
        offset: Vec2,
        shell_radius: f32,
        kind: ParticleKind,
        gap: f32,
        angular_speed: f32,
    ) -> Self {
        Self {
            offset,
            shell_radius,
            kind,
            gap,
            angular_speed,
        }
    }
}

/// A level: one element's electron configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub name: String,
    pub symbol: String,
    pub atomic_number: u32,
    /// Short fact shown between levels
    #[serde(default)]
    pub fact: String,
    pub slots: Vec<SlotDefinition>,
}

impl LevelDefinition {
    /// Distinct shell radii, ascending
    pub fn shell_radii(&self) -> Vec<f32> {
        let mut radii: Vec<f32> = self.slots.iter().map(|s| s.shell_radius).collect();
        radii.sort_by(|a, b| a.total_cmp(b));
        radii.dedup_by(|a, b| (*a - *b).abs() < SHELL_TOLERANCE);
        radii
    }

    /// Index of the shell containing `radius` in [`Self::shell_radii`]
    pub fn shell_index(radii: &[f32], radius: f32) -> usize {
        radii
            .iter()
            .position(|r| (r - radius).abs() < SHELL_TOLERANCE)
            .unwrap_or(0)
    }

    /// Number of slots (and so particles) of the given kind
    pub fn count_of(&self, kind: ParticleKind) -> usize {
        self.slots.iter().filter(|s| s.kind == kind).count()
    }

    fn validate(&self, level: usize) -> Result<(), LevelError> {
        if self.slots.is_empty() {
            return Err(LevelError::EmptyLevel { level });
        }

        for (slot, def) in self.slots.iter().enumerate() {
            let invalid = |reason| LevelError::InvalidSlot {
                level,
                slot,
                reason,
            };
            if !def.offset.is_finite() {
                return Err(invalid("offset must be finite"));
            }
            if !(def.shell_radius.is_finite() && def.shell_radius > 0.0) {
                return Err(invalid("shell radius must be positive"));
            }
            if !(def.gap > 0.0 && def.gap < std::f32::consts::TAU) {
                return Err(invalid("gap must be within (0, 2π)"));
            }
            if !def.angular_speed.is_finite() {
                return Err(invalid("angular speed must be finite"));
            }
        }

        for shell_radius in self.shell_radii() {
            let has_primary = self.slots.iter().any(|s| {
                s.kind == ParticleKind::Primary
                    && (s.shell_radius - shell_radius).abs() < SHELL_TOLERANCE
            });
            if !has_primary {
                return Err(LevelError::MissingPrimaryGroup {
                    level,
                    shell_radius,
                });
            }
        }

        Ok(())
    }
}

/// Ordered, validated level list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Catalog {
    levels: Vec<LevelDefinition>,
}

impl Catalog {
    /// Validate and wrap a level list
    pub fn new(levels: Vec<LevelDefinition>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyCatalog);
        }
        for (index, level) in levels.iter().enumerate() {
            level.validate(index)?;
        }
        Ok(Self { levels })
    }

    /// Parse a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<LevelDefinition> =
            serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))?;
        Self::new(levels)
    }

    /// The shipped element progression (H, He, Li, C, N)
    pub fn builtin() -> Self {
        use ParticleKind::{Primary, Secondary};

        // Inner shell: radius 80, gap 0.3, 1.2 rad/s
        let inner = |x: f32, y: f32| SlotDefinition::new(Vec2::new(x, y), 80.0, Primary, 0.3, 1.2);
        // Outer shell: radius 140, gap 0.25, 1.32 rad/s
        let outer = |x: f32, y: f32, kind| {
            SlotDefinition::new(Vec2::new(x, y), 140.0, kind, 0.25, 1.32)
        };

        let level = |name: &str, symbol: &str, atomic_number, fact: &str, slots| LevelDefinition {
            name: name.to_string(),
            symbol: symbol.to_string(),
            atomic_number,
            fact: fact.to_string(),
            slots,
        };

        Self {
            levels: vec![
                level(
                    "Hydrogen",
                    "H",
                    1,
                    "Simplest atom - just 1 proton and 1 electron",
                    vec![inner(80.0, 0.0)],
                ),
                level(
                    "Helium",
                    "He",
                    2,
                    "Noble gas - completely filled electron shell",
                    vec![inner(80.0, 0.0), inner(-80.0, 0.0)],
                ),
                level(
                    "Lithium",
                    "Li",
                    3,
                    "Alkali metal - very reactive due to single outer electron",
                    vec![inner(80.0, 0.0), inner(-80.0, 0.0), outer(140.0, 0.0, Primary)],
                ),
                level(
                    "Carbon",
                    "C",
                    6,
                    "Forms 4 bonds - basis of all organic chemistry",
                    vec![
                        inner(80.0, 0.0),
                        inner(-80.0, 0.0),
                        outer(140.0, 0.0, Primary),
                        outer(-140.0, 0.0, Primary),
                        outer(0.0, 140.0, Secondary),
                        outer(0.0, -140.0, Secondary),
                    ],
                ),
                level(
                    "Nitrogen",
                    "N",
                    7,
                    "Essential for proteins and DNA",
                    vec![
                        inner(80.0, 0.0),
                        inner(-80.0, 0.0),
                        outer(140.0, 0.0, Primary),
                        outer(-140.0, 0.0, Primary),
                        outer(0.0, 140.0, Secondary),
                        outer(0.0, -140.0, Secondary),
                        outer(99.0, 99.0, Secondary),
                    ],
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level at `index`, clamped to the last entry
    pub fn level(&self, index: usize) -> &LevelDefinition {
        &self.levels[index.min(self.levels.len() - 1)]
    }

    pub fn levels(&self) -> &[LevelDefinition] {
        &self.levels
    }
}
