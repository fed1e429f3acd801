//! Preset Catalog - Roll and Material Choices
//!
//! Presets are catalog entries a caller picks from. The engine never chooses
//! between them; a preset only fills the roll or cost fields of a request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::PresetError;
use crate::input::{JobForm, RollSpec};
use crate::ENGINE_VERSION;

pub type PresetId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollPreset {
    pub id: PresetId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub physical_width_in: f64,
    pub usable_width_in: f64,
    pub roll_length_ft: f64,
    pub spacing_in: f64,
    pub max_section_length_in: f64,
}

impl RollPreset {
    pub fn roll_spec(&self) -> RollSpec {
        RollSpec {
            usable_width_in: self.usable_width_in,
            spacing_in: self.spacing_in,
            max_section_length_in: self.max_section_length_in,
            roll_length_ft: self.roll_length_ft,
            physical_width_in: Some(self.physical_width_in),
        }
    }

    /// The roll fields of a job form.
    pub fn to_form(&self) -> JobForm {
        JobForm {
            usable_width_in: Some(self.usable_width_in),
            physical_width_in: Some(self.physical_width_in),
            spacing_in: Some(self.spacing_in),
            max_section_length_in: Some(self.max_section_length_in),
            roll_length_ft: Some(self.roll_length_ft),
            ..JobForm::default()
        }
    }

    fn check(&self) -> Result<(), PresetError> {
        let fields = [
            ("physicalWidthIn", self.physical_width_in),
            ("usableWidthIn", self.usable_width_in),
            ("rollLengthFt", self.roll_length_ft),
            ("spacingIn", self.spacing_in),
            ("maxSectionLengthIn", self.max_section_length_in),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(self.invalid(format!("{} must be positive", name)));
        }
        if self.usable_width_in > self.physical_width_in {
            return Err(self.invalid("usable width exceeds physical width".to_string()));
        }
        Ok(())
    }

    fn invalid(&self, message: String) -> PresetError {
        PresetError::InvalidPreset { id: self.id.clone(), message }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialKind {
    Substrate,
    Laminate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPreset {
    pub id: PresetId,
    pub name: String,
    pub kind: MaterialKind,
    pub cost_per_roll: f64,
}

impl MaterialPreset {
    /// The cost field of a job form matching this material's kind.
    pub fn to_form(&self) -> JobForm {
        match self.kind {
            MaterialKind::Substrate => JobForm {
                material_cost_per_roll: Some(self.cost_per_roll),
                ..JobForm::default()
            },
            MaterialKind::Laminate => JobForm {
                laminate_cost_per_roll: Some(self.cost_per_roll),
                ..JobForm::default()
            },
        }
    }

    fn check(&self) -> Result<(), PresetError> {
        if !(self.cost_per_roll.is_finite() && self.cost_per_roll > 0.0) {
            return Err(PresetError::InvalidPreset {
                id: self.id.clone(),
                message: "costPerRoll must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// One preset file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetCatalog {
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    #[serde(default)]
    pub rolls: Vec<RollPreset>,
    #[serde(default)]
    pub materials: Vec<MaterialPreset>,
}

fn default_engine_min_version() -> String { "1.0.0".to_string() }

impl PresetCatalog {
    /// Read and check a single catalog file.
    pub fn load_file(path: &Path) -> Result<Self, PresetError> {
        let content = fs::read_to_string(path).map_err(|source| PresetError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Self = serde_json::from_str(&content).map_err(|source| PresetError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        catalog.check()?;
        Ok(catalog)
    }

    pub fn check(&self) -> Result<(), PresetError> {
        check_engine_version(&self.engine_min_version)?;
        for roll in &self.rolls {
            roll.check()?;
        }
        for material in &self.materials {
            material.check()?;
        }
        Ok(())
    }
}

fn check_engine_version(required: &str) -> Result<(), PresetError> {
    let mismatch = || PresetError::EngineVersionMismatch {
        required: required.to_string(),
        current: ENGINE_VERSION.to_string(),
    };
    let engine_ver = semver::Version::parse(ENGINE_VERSION).map_err(|_| mismatch())?;
    let min_ver = semver::Version::parse(required).map_err(|_| mismatch())?;

    if engine_ver < min_ver {
        return Err(mismatch());
    }
    Ok(())
}

/// Preset registry - holds the roll and material catalog
#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    rolls: BTreeMap<PresetId, RollPreset>,
    materials: BTreeMap<PresetId, MaterialPreset>,
}

impl PresetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock catalog shipped with the engine.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_roll(RollPreset {
            id: "54in-150ft".to_string(),
            name: "54\" x 150' roll".to_string(),
            description: "Wide-format roll, 3/8\" margin each side".to_string(),
            physical_width_in: 54.0,
            usable_width_in: 53.25,
            roll_length_ft: 150.0,
            spacing_in: 0.125,
            max_section_length_in: 42.0,
        });
        registry.register_roll(RollPreset {
            id: "30in-150ft".to_string(),
            name: "30\" x 150' roll".to_string(),
            description: "Narrow roll, 3/8\" margin each side".to_string(),
            physical_width_in: 30.0,
            usable_width_in: 29.25,
            roll_length_ft: 150.0,
            spacing_in: 0.125,
            max_section_length_in: 42.0,
        });
        for (id, name, kind, cost_per_roll) in [
            ("white-vinyl", "White gloss vinyl", MaterialKind::Substrate, 189.00),
            ("clear-vinyl", "Clear vinyl", MaterialKind::Substrate, 214.00),
            ("gloss-laminate", "Gloss laminate", MaterialKind::Laminate, 128.00),
            ("matte-laminate", "Matte laminate", MaterialKind::Laminate, 136.00),
        ] {
            registry.register_material(MaterialPreset {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                cost_per_roll,
            });
        }
        registry
    }

    /// Adds every catalog file (`*.json`) in `dir` to the registry.
    ///
    /// Unreadable directories are errors. Files that fail to parse, fail
    /// checks, or need a newer engine are skipped with a warning.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, PresetError> {
        let read_error = |source| PresetError::ReadError { path: dir.to_path_buf(), source };
        let mut paths: Vec<_> = fs::read_dir(dir)
            .map_err(read_error)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().map_or(false, |e| e == "json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            match PresetCatalog::load_file(&path) {
                Ok(catalog) => {
                    loaded += catalog.rolls.len() + catalog.materials.len();
                    self.register_catalog(catalog);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping preset file"),
            }
        }
        tracing::debug!(dir = %dir.display(), loaded, "loaded presets");
        Ok(loaded)
    }

    /// The built-in catalog plus every preset file in `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, PresetError> {
        let mut registry = Self::builtin();
        registry.load_dir(dir)?;
        Ok(registry)
    }

    pub fn register_catalog(&mut self, catalog: PresetCatalog) {
        for roll in catalog.rolls {
            self.register_roll(roll);
        }
        for material in catalog.materials {
            self.register_material(material);
        }
    }

    pub fn register_roll(&mut self, preset: RollPreset) {
        self.rolls.insert(preset.id.clone(), preset);
    }

    pub fn register_material(&mut self, preset: MaterialPreset) {
        self.materials.insert(preset.id.clone(), preset);
    }

    pub fn roll(&self, id: &str) -> Option<&RollPreset> {
        self.rolls.get(id)
    }

    pub fn material(&self, id: &str) -> Option<&MaterialPreset> {
        self.materials.get(id)
    }

    pub fn list_rolls(&self) -> Vec<&RollPreset> {
        self.rolls.values().collect()
    }

    pub fn list_materials_of(&self, kind: MaterialKind) -> Vec<&MaterialPreset> {
        self.materials.values().filter(|m| m.kind == kind).collect()
    }
}
