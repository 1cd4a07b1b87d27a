//! Configuration de la visionneuse

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use referentiel::{LoadOptions, MalformedPolicy, DEFAULT_TABLE_PATH};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::map::MapMode;

/// Noms des presets embarqués
pub const PRESETS: &[&str] = &["default", "complete"];

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Fichier CSV du référentiel
    pub data_path: PathBuf,

    /// Répertoire des cartes générées (créé si absent)
    pub output_dir: PathBuf,

    /// Séparateur CSV; `null` = détection automatique
    pub delimiter: Option<char>,

    /// Politique face aux lignes malformées (abort/skip)
    pub on_malformed: MalformedPolicy,

    pub limits: MarkerLimits,
    pub map: MapSettings,
    pub files: OutputFiles,
}

/// Nombre maximal de marqueurs par carte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct MarkerLimits {
    pub all: usize,
    pub subset: usize,
}

/// Paramètres d'affichage de la carte
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapSettings {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    /// Gabarit d'URL des tuiles (`{s}`, `{z}`, `{x}`, `{y}`)
    pub tiles_url: String,
    /// Attribution HTML des tuiles
    pub attribution: String,
    pub title: String,
    pub legend: String,
}

/// Noms des fichiers HTML générés
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputFiles {
    pub all: String,
    pub subset: String,
    /// Carte générée directement depuis un fichier de codes
    pub auto: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_TABLE_PATH),
            output_dir: PathBuf::from("output"),
            delimiter: None,
            on_malformed: MalformedPolicy::Abort,
            limits: MarkerLimits::default(),
            map: MapSettings::default(),
            files: OutputFiles::default(),
        }
    }
}

impl Default for MarkerLimits {
    fn default() -> Self {
        Self {
            all: MapMode::All.default_cap(),
            subset: MapMode::Subset.default_cap(),
        }
    }
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center_lat: 46.0,
            center_lon: 2.0,
            zoom: 6,
            tiles_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            title: "JBW Viewer".to_string(),
            legend: "Cliquez sur un marqueur pour plus d'informations".to_string(),
        }
    }
}

impl Default for OutputFiles {
    fn default() -> Self {
        Self {
            all: "pr_map.html".to_string(),
            subset: "pr_specific_map.html".to_string(),
            auto: "auto_generated_map.html".to_string(),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "default" => Self::load_embedded(include_str!("presets/default.json")),
            "complete" => Self::load_embedded(include_str!("presets/complete.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: {}", preset, PRESETS.join(", ")),
        }
    }

    /// Nom de preset ou chemin vers un fichier JSON
    pub fn resolve(name_or_path: &str) -> Result<Self> {
        if PRESETS.contains(&name_or_path) {
            Self::from_preset(name_or_path)
        } else {
            Self::load(Path::new(name_or_path))
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Applique les variables d'environnement `JBW_*`
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applique des surcharges lues par `lookup`; une valeur invalide est ignorée
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("JBW_DATA_PATH") {
            debug!(path = %path, "JBW_DATA_PATH override");
            self.data_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("JBW_OUTPUT_DIR") {
            debug!(dir = %dir, "JBW_OUTPUT_DIR override");
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(cap) = parse_limit(&lookup, "JBW_MAX_MARKERS") {
            self.limits.all = cap;
        }
        if let Some(cap) = parse_limit(&lookup, "JBW_SUBSET_MAX_MARKERS") {
            self.limits.subset = cap;
        }
    }

    /// Options de chargement du référentiel
    pub fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::default().with_policy(self.on_malformed);

        match self.delimiter {
            Some(c) if c.is_ascii() => options = options.with_delimiter(c as u8),
            Some(c) => warn!(delimiter = %c, "Non-ASCII delimiter ignored, using detection"),
            None => {}
        }

        options
    }
}

fn parse_limit(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<usize> {
    let raw = lookup(name)?;
    match raw.trim().parse::<usize>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring invalid marker limit");
            None
        }
    }
}
