//! Static model catalog and registry resolution.
//!
//! Every logical model has one row holding the id it is published under on
//! each registry. The local directory depends on the logical name only, so a
//! model fetched from either registry lands in the same place.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default models root, relative to the working directory.
pub const DEFAULT_MODELS_ROOT: &str = "pretrained_models";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModelId {
    CosyVoice3,
    CosyVoice2,
    CosyVoice300M,
    CosyVoice300MSft,
    CosyVoice300MInstruct,
    Ttsfrd,
}

impl ModelId {
    pub const ALL: [ModelId; 6] = [
        ModelId::CosyVoice3,
        ModelId::CosyVoice2,
        ModelId::CosyVoice300M,
        ModelId::CosyVoice300MSft,
        ModelId::CosyVoice300MInstruct,
        ModelId::Ttsfrd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::CosyVoice3 => "cosyvoice3",
            ModelId::CosyVoice2 => "cosyvoice2",
            ModelId::CosyVoice300M => "cosyvoice-300m",
            ModelId::CosyVoice300MSft => "cosyvoice-300m-sft",
            ModelId::CosyVoice300MInstruct => "cosyvoice-300m-instruct",
            ModelId::Ttsfrd => "cosyvoice-ttsfrd",
        }
    }

    /// Human-facing name, also the directory name under the models root.
    pub fn display_name(&self) -> &'static str {
        lookup(*self).dir_name
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::UnknownModel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// ModelScope, recommended inside mainland China
    #[default]
    ModelScope,
    /// HuggingFace Hub
    HuggingFace,
}

impl ModelSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelSource::ModelScope => "modelscope",
            ModelSource::HuggingFace => "huggingface",
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modelscope" => Ok(ModelSource::ModelScope),
            "huggingface" => Ok(ModelSource::HuggingFace),
            other => Err(Error::Config(format!("unknown model source '{}'", other))),
        }
    }
}

/// One row of the catalog.
#[derive(Debug)]
pub struct CatalogRow {
    pub id: ModelId,
    pub dir_name: &'static str,
    pub modelscope_id: &'static str,
    pub huggingface_id: &'static str,
}

impl CatalogRow {
    pub fn registry_id(&self, source: ModelSource) -> &'static str {
        match source {
            ModelSource::ModelScope => self.modelscope_id,
            ModelSource::HuggingFace => self.huggingface_id,
        }
    }
}

pub const CATALOG: &[CatalogRow] = &[
    CatalogRow {
        id: ModelId::CosyVoice3,
        dir_name: "Fun-CosyVoice3-0.5B",
        modelscope_id: "FunAudioLLM/Fun-CosyVoice3-0.5B-2512",
        huggingface_id: "FunAudioLLM/Fun-CosyVoice3-0.5B-2512",
    },
    CatalogRow {
        id: ModelId::CosyVoice2,
        dir_name: "CosyVoice2-0.5B",
        modelscope_id: "iic/CosyVoice2-0.5B",
        huggingface_id: "FunAudioLLM/CosyVoice2-0.5B",
    },
    CatalogRow {
        id: ModelId::CosyVoice300M,
        dir_name: "CosyVoice-300M",
        modelscope_id: "iic/CosyVoice-300M",
        huggingface_id: "FunAudioLLM/CosyVoice-300M",
    },
    CatalogRow {
        id: ModelId::CosyVoice300MSft,
        dir_name: "CosyVoice-300M-SFT",
        modelscope_id: "iic/CosyVoice-300M-SFT",
        huggingface_id: "FunAudioLLM/CosyVoice-300M-SFT",
    },
    CatalogRow {
        id: ModelId::CosyVoice300MInstruct,
        dir_name: "CosyVoice-300M-Instruct",
        modelscope_id: "iic/CosyVoice-300M-Instruct",
        huggingface_id: "FunAudioLLM/CosyVoice-300M-Instruct",
    },
    CatalogRow {
        id: ModelId::Ttsfrd,
        dir_name: "CosyVoice-ttsfrd",
        modelscope_id: "iic/CosyVoice-ttsfrd",
        huggingface_id: "FunAudioLLM/CosyVoice-ttsfrd",
    },
];

pub fn lookup(id: ModelId) -> &'static CatalogRow {
    CATALOG
        .iter()
        .find(|row| row.id == id)
        .unwrap_or_else(|| unreachable!("every ModelId has a catalog row"))
}

/// A model as it will be fetched in one run: which registry id, which local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub id: ModelId,
    pub registry_id: &'static str,
    pub local_path: PathBuf,
}

/// Local directory of a model under `root`.
pub fn local_path(root: &Path, id: ModelId) -> PathBuf {
    root.join(lookup(id).dir_name)
}

/// Resolve the catalog for `source` under the default models root.
pub fn resolve(source: ModelSource) -> Vec<ModelEntry> {
    resolve_in(source, Path::new(DEFAULT_MODELS_ROOT))
}

/// Resolve the catalog for `source` under `root`, in catalog order.
pub fn resolve_in(source: ModelSource, root: &Path) -> Vec<ModelEntry> {
    CATALOG
        .iter()
        .map(|row| ModelEntry {
            id: row.id,
            registry_id: row.registry_id(source),
            local_path: root.join(row.dir_name),
        })
        .collect()
}

/// Which models a download run should cover.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelSelection {
    #[default]
    All,
    Only(Vec<ModelId>),
}

impl ModelSelection {
    /// Build a selection from CLI words; `all` anywhere wins.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, Error> {
        if names.is_empty() || names.iter().any(|n| n.as_ref().eq_ignore_ascii_case("all")) {
            return Ok(ModelSelection::All);
        }
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            let id: ModelId = name.as_ref().parse()?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ModelSelection::Only(ids))
    }

    /// Filter resolved entries, keeping catalog order.
    pub fn select(&self, entries: Vec<ModelEntry>) -> Vec<ModelEntry> {
        match self {
            ModelSelection::All => entries,
            ModelSelection::Only(ids) => entries
                .into_iter()
                .filter(|entry| ids.contains(&entry.id))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_do_not_depend_on_source() {
        let a = resolve(ModelSource::ModelScope);
        let b = resolve(ModelSource::HuggingFace);
        assert_eq!(a.len(), CATALOG.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.local_path, y.local_path);
        }
    }

    #[test]
    fn registry_ids_follow_the_source() {
        let ms = resolve(ModelSource::ModelScope);
        let hf = resolve(ModelSource::HuggingFace);
        assert_eq!(ms[1].registry_id, "iic/CosyVoice2-0.5B");
        assert_eq!(hf[1].registry_id, "FunAudioLLM/CosyVoice2-0.5B");
        assert_eq!(
            ms[1].local_path,
            Path::new("pretrained_models").join("CosyVoice2-0.5B")
        );
    }

    #[test]
    fn every_id_has_a_row() {
        for id in ModelId::ALL {
            assert_eq!(lookup(id).id, id);
            assert_eq!(id.as_str().parse::<ModelId>().unwrap(), id);
        }
    }

    #[test]
    fn selection_all_wins() {
        let sel = ModelSelection::from_names(&["cosyvoice2", "all"]).unwrap();
        assert_eq!(sel, ModelSelection::All);
        assert_eq!(ModelSelection::from_names::<&str>(&[]).unwrap(), ModelSelection::All);
    }

    #[test]
    fn selection_filters_in_catalog_order() {
        let sel = ModelSelection::from_names(&["cosyvoice-ttsfrd", "cosyvoice3"]).unwrap();
        let picked = sel.select(resolve(ModelSource::HuggingFace));
        let ids: Vec<_> = picked.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![ModelId::CosyVoice3, ModelId::Ttsfrd]);
    }

    #[test]
    fn unknown_model_name_is_rejected() {
        assert!(matches!(
            ModelSelection::from_names(&["cosyvoice9"]),
            Err(Error::UnknownModel(_))
        ));
    }

    #[test]
    fn source_parses_case_insensitively() {
        assert_eq!("HuggingFace".parse::<ModelSource>().unwrap(), ModelSource::HuggingFace);
        assert_eq!(ModelSource::default(), ModelSource::ModelScope);
        assert!("s3".parse::<ModelSource>().is_err());
    }
}
