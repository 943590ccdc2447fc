//! Group specifications and their resolution into a canonical mapping.
//!
//! A group specification arrives as text (inline on the command line or in
//! a file) in one of two shapes:
//!
//! - a sequence of groups, `[[1, 2, 3], [4, 5]]`, where group `i` becomes
//!   new label `start_label + i`;
//! - a mapping of new label to groups, `{"10": [1, 2, 3], "20": [4, 5]}`,
//!   where the keys are used verbatim.
//!
//! [`resolve`] validates the specification and produces a
//! [`CanonicalMapping`], the only form the relabel engine consumes.

pub mod literal;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::LabelmergeError;
use crate::relabel::LabelDtype;

pub use literal::{parse_literal, LiteralError};

/// Where the text of a group specification comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecSource {
    /// A file holding JSON, literal or YAML text.
    File(PathBuf),
    /// The specification text itself.
    Inline(String),
}

impl SpecSource {
    /// Interprets a command-line argument: an existing path is a file,
    /// anything else is inline text.
    pub fn from_arg(arg: &str) -> Self {
        let path = Path::new(arg);
        if path.exists() {
            SpecSource::File(path.to_path_buf())
        } else {
            SpecSource::Inline(arg.to_string())
        }
    }

    /// Reads and parses the specification.
    pub fn load(&self) -> Result<GroupSpec, LabelmergeError> {
        match self {
            SpecSource::File(path) => {
                let text =
                    fs::read_to_string(path).map_err(|source| LabelmergeError::GroupsRead {
                        path: path.clone(),
                        source,
                    })?;
                if is_yaml_path(path) {
                    parse_group_yaml(&text)
                } else {
                    parse_group_text(&text)
                }
            }
            SpecSource::Inline(text) => parse_group_text(text),
        }
    }
}

/// Loads a group specification from a command-line argument that is either
/// a path or inline text.
pub fn load_group_spec(arg: &str) -> Result<GroupSpec, LabelmergeError> {
    SpecSource::from_arg(arg).load()
}

fn is_yaml_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}

/// Parses specification text: JSON first, then the permissive literal syntax.
pub fn parse_group_text(text: &str) -> Result<GroupSpec, LabelmergeError> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => GroupSpec::from_value(&value),
        Err(json_err) => match parse_literal(text) {
            Ok(value) => GroupSpec::from_value(&value),
            Err(literal_err) => Err(LabelmergeError::spec_format(format!(
                "not valid JSON ({}) or literal ({})",
                json_err, literal_err
            ))),
        },
    }
}

/// Parses specification text written as YAML.
pub fn parse_group_yaml(text: &str) -> Result<GroupSpec, LabelmergeError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text)
        .map_err(|e| LabelmergeError::spec_format(format!("not valid YAML ({})", e)))?;
    let value = serde_json::to_value(&yaml).map_err(|e| {
        LabelmergeError::spec_format(format!("unsupported YAML structure ({})", e))
    })?;
    GroupSpec::from_value(&value)
}

/// A parsed group specification, before validation.
///
/// Groups keep their members in input order, duplicates included, so that
/// resolution can report them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupSpec {
    /// Groups numbered sequentially from a start label.
    Sequence(Vec<Vec<i64>>),
    /// Explicit `(new_label, originals)` entries in input order.
    Mapping(Vec<(i64, Vec<i64>)>),
}

impl GroupSpec {
    /// Interprets a structured value as one of the two specification shapes.
    pub fn from_value(value: &Value) -> Result<Self, LabelmergeError> {
        match value {
            Value::Array(groups) => groups
                .iter()
                .enumerate()
                .map(|(i, group)| group_members(group, &format!("groups[{}]", i)))
                .collect::<Result<Vec<_>, _>>()
                .map(GroupSpec::Sequence),
            Value::Object(entries) => entries
                .iter()
                .map(|(key, group)| {
                    let new_label = parse_key(key)?;
                    let members = group_members(group, &format!("groups[{:?}]", key))?;
                    Ok((new_label, members))
                })
                .collect::<Result<Vec<_>, LabelmergeError>>()
                .map(GroupSpec::Mapping),
            other => Err(LabelmergeError::spec_format(format!(
                "expected a sequence of groups or a mapping of new label to groups, found {}",
                value_kind(other)
            ))),
        }
    }

    /// Number of groups or mapping entries.
    pub fn len(&self) -> usize {
        match self {
            GroupSpec::Sequence(groups) => groups.len(),
            GroupSpec::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn parse_key(key: &str) -> Result<i64, LabelmergeError> {
    key.trim().parse::<i64>().map_err(|_| {
        LabelmergeError::spec_format(format!(
            "mapping key {:?} is not an integer label",
            key
        ))
    })
}

/// A group is a sequence of labels or a single label.
fn group_members(value: &Value, location: &str) -> Result<Vec<i64>, LabelmergeError> {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| label_value(item, &format!("{}[{}]", location, i)))
            .collect(),
        single => label_value(single, location).map(|label| vec![label]),
    }
}

fn label_value(value: &Value, location: &str) -> Result<i64, LabelmergeError> {
    let label = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    label.ok_or_else(|| {
        LabelmergeError::spec_format(format!(
            "{}: expected an integer label, found {}",
            location, value
        ))
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

/// Options for resolving a specification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// New label of the first group in sequence form.
    pub start_label: i64,
    /// Keep background voxels (label 0) at 0.
    pub preserve_zero: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            start_label: 1,
            preserve_zero: true,
        }
    }
}

/// What happens to voxels labelled 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZeroPolicy {
    /// 0 always stays 0.
    Preserve,
    /// 0 is an ordinary label.
    Relabel,
}

impl From<bool> for ZeroPolicy {
    fn from(preserve_zero: bool) -> Self {
        if preserve_zero {
            ZeroPolicy::Preserve
        } else {
            ZeroPolicy::Relabel
        }
    }
}

/// A non-fatal observation made while resolving a specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveNote {
    /// A label appears more than once in the same group.
    DuplicateInGroup { label: i64, new_label: i64 },
    /// Label 0 was listed but zero is preserved.
    ZeroIgnored { new_label: i64 },
    /// A group with no members.
    EmptyGroup { new_label: i64 },
    /// The same new label is declared by more than one mapping entry.
    RepeatedNewLabel { new_label: i64 },
}

impl fmt::Display for ResolveNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveNote::DuplicateInGroup { label, new_label } => write!(
                f,
                "label {} is listed more than once in the group for new label {}",
                label, new_label
            ),
            ResolveNote::ZeroIgnored { new_label } => write!(
                f,
                "label 0 in the group for new label {} is ignored because zero is preserved",
                new_label
            ),
            ResolveNote::EmptyGroup { new_label } => {
                write!(f, "the group for new label {} is empty", new_label)
            }
            ResolveNote::RepeatedNewLabel { new_label } => write!(
                f,
                "new label {} is declared more than once; its groups are merged",
                new_label
            ),
        }
    }
}

/// The validated `old -> new` table plus the zero policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalMapping {
    table: BTreeMap<i64, i64>,
    zero_policy: ZeroPolicy,
    notes: Vec<ResolveNote>,
}

impl CanonicalMapping {
    /// Output label for an input label.
    ///
    /// Unlisted labels map to themselves, and 0 maps to 0 under
    /// [`ZeroPolicy::Preserve`].
    pub fn lookup(&self, old: i64) -> i64 {
        if old == 0 && self.zero_policy == ZeroPolicy::Preserve {
            return 0;
        }
        self.table.get(&old).copied().unwrap_or(old)
    }

    /// Returns the new label if `old` is listed in the table.
    pub fn get(&self, old: i64) -> Option<i64> {
        self.table.get(&old).copied()
    }

    pub fn zero_policy(&self) -> ZeroPolicy {
        self.zero_policy
    }

    pub fn notes(&self) -> &[ResolveNote] {
        &self.notes
    }

    /// Iterates `(old, new)` pairs in ascending order of the old label.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.table.iter().map(|(&old, &new)| (old, new))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Checks that every new label in the table fits in `dtype`.
    ///
    /// Labels that pass through unchanged are only known once the volume is
    /// read, so this is a partial check run ahead of the full one.
    pub fn check_dtype(&self, dtype: LabelDtype) -> Result<(), LabelmergeError> {
        self.table.values().try_for_each(|&new| dtype.check(new))
    }
}

/// Resolves a specification into a [`CanonicalMapping`].
///
/// # Errors
/// - [`LabelmergeError::LabelCollision`] when an original label is claimed
///   by two different new labels.
/// - [`LabelmergeError::SpecFormat`] when sequential numbering overflows.
pub fn resolve(
    spec: &GroupSpec,
    opts: &ResolveOptions,
) -> Result<CanonicalMapping, LabelmergeError> {
    let entries: Vec<(i64, &[i64])> = match spec {
        GroupSpec::Sequence(groups) => groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                i64::try_from(index)
                    .ok()
                    .and_then(|i| opts.start_label.checked_add(i))
                    .map(|new_label| (new_label, group.as_slice()))
                    .ok_or_else(|| {
                        LabelmergeError::spec_format(format!(
                            "start label {} plus group index {} overflows",
                            opts.start_label, index
                        ))
                    })
            })
            .collect::<Result<_, _>>()?,
        GroupSpec::Mapping(entries) => entries
            .iter()
            .map(|(new_label, group)| (*new_label, group.as_slice()))
            .collect(),
    };

    let zero_policy = ZeroPolicy::from(opts.preserve_zero);
    let mut table: BTreeMap<i64, i64> = BTreeMap::new();
    let mut notes = Vec::new();
    let mut declared: BTreeSet<i64> = BTreeSet::new();

    for (new_label, group) in entries {
        if !declared.insert(new_label) {
            notes.push(ResolveNote::RepeatedNewLabel { new_label });
        }

        if group.is_empty() {
            notes.push(ResolveNote::EmptyGroup { new_label });
        }

        let mut seen_in_group = BTreeSet::new();
        for &old in group {
            if !seen_in_group.insert(old) {
                let note = ResolveNote::DuplicateInGroup {
                    label: old,
                    new_label,
                };
                if !notes.contains(&note) {
                    notes.push(note);
                }
                continue;
            }

            match table.get(&old) {
                Some(&existing) if existing != new_label => {
                    return Err(LabelmergeError::LabelCollision {
                        label: old,
                        first: existing,
                        second: new_label,
                    });
                }
                Some(_) => {}
                None => {
                    table.insert(old, new_label);
                }
            }

            if old == 0 && zero_policy == ZeroPolicy::Preserve {
                notes.push(ResolveNote::ZeroIgnored { new_label });
            }
        }
    }

    // Zero takes part in collision checks but stays background.
    if zero_policy == ZeroPolicy::Preserve {
        table.remove(&0);
    }

    Ok(CanonicalMapping {
        table,
        zero_policy,
        notes,
    })
}
