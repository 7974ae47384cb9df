//! Reachability analysis over the project's assets and classes.
//!
//! # Partitioning
//!
//! 1. Every asset whose name fails the [`NameFilter`] is *excluded*.
//! 2. Starting from the preloader scene and the default fader prefab, every
//!    asset transitively referenced by a serialized graph is added to the
//!    *preloader* partition. References are string property values naming a
//!    known image, sound, prefab, scene or resource; the default values of the
//!    classes a graph uses are searched too. An atlas frame pulls in its atlas.
//! 3. Every other non-excluded asset lands in the *main* partition.
//!
//! # Class retention
//!
//! A class is retained when its name is used as a node class (`"c"`) in any
//! non-excluded scene or prefab, or when it is an ancestor (through `extends`)
//! of a retained class. Classes named in the `requiredComponents` of a retained
//! class are then retained as well; an unknown requirement is a warning.

use crate::error::{Error, Result};
use crate::filter::NameFilter;
use crate::graph::{collect_class_names, collect_strings};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use thing_project::asset::AssetId;
use thing_project::{AssetFile, AssetIndex, AssetKind, ClassDesc};

/// Kinds a string property value can refer to.
const REFERENCE_KINDS: [AssetKind; 5] = [
    AssetKind::Image,
    AssetKind::Sound,
    AssetKind::Prefab,
    AssetKind::Scene,
    AssetKind::Resource,
];

/// Three disjoint sets covering every registered asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub preloader: BTreeSet<AssetId>,
    pub main: BTreeSet<AssetId>,
    pub excluded: BTreeSet<AssetId>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.preloader.len() + self.main.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A retained class as it is emitted into the registration module.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassManifestEntry {
    pub class_name: String,
    pub source_path: String,
    /// Declared defaults with excluded keys and children removed.
    pub default_values: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassRetention {
    /// Sorted by class name.
    pub retained: Vec<ClassManifestEntry>,
    pub pruned: Vec<String>,
    pub warnings: Vec<String>,
}

pub struct DependencyAnalyzer<'a> {
    assets: &'a AssetIndex,
    filter: NameFilter,
    preloader_scene: &'a str,
    default_fader: &'a str,
}

impl<'a> DependencyAnalyzer<'a> {
    pub fn new(
        assets: &'a AssetIndex,
        filter: NameFilter,
        preloader_scene: &'a str,
        default_fader: &'a str,
    ) -> Self {
        Self {
            assets,
            filter,
            preloader_scene,
            default_fader,
        }
    }

    pub fn partition(&self) -> Result<Partition> {
        let mut partition = Partition::default();
        let mut candidates = BTreeSet::new();
        for asset in self.assets.list(None) {
            if self.filter.is_name_valid(&asset.name) {
                candidates.insert(asset.id());
            } else {
                tracing::debug!("Excluding {} {} from build", asset.kind, asset.name);
                partition.excluded.insert(asset.id());
            }
        }

        let preloader_id = (AssetKind::Scene, self.preloader_scene.to_string());
        if !candidates.contains(&preloader_id) {
            return Err(Error::MissingAsset {
                name: self.preloader_scene.to_string(),
                kind: AssetKind::Scene,
            });
        }
        let mut queue = VecDeque::from([preloader_id]);

        let fader_id = (AssetKind::Prefab, self.default_fader.to_string());
        if candidates.contains(&fader_id) {
            queue.push_back(fader_id);
        } else {
            tracing::warn!("Default fader prefab \"{}\" not found", self.default_fader);
        }

        for id in &queue {
            partition.preloader.insert(id.clone());
        }
        while let Some((kind, name)) = queue.pop_front() {
            let Some(asset) = self.assets.get(&name, kind) else {
                continue;
            };
            for reference in self.references(asset) {
                if candidates.contains(&reference) && partition.preloader.insert(reference.clone()) {
                    queue.push_back(reference);
                }
            }
        }

        partition.main = candidates
            .difference(&partition.preloader)
            .cloned()
            .collect();

        tracing::info!(
            "Partitioned assets: preloader={} main={} excluded={}",
            partition.preloader.len(),
            partition.main.len(),
            partition.excluded.len()
        );
        Ok(partition)
    }

    /// Assets `asset` refers to directly.
    pub fn references(&self, asset: &AssetFile) -> BTreeSet<AssetId> {
        let mut out = BTreeSet::new();

        if let Some(parent) = &asset.parent_asset {
            out.insert((AssetKind::Resource, parent.clone()));
        }

        let graph = match asset.kind {
            AssetKind::Scene | AssetKind::Prefab => asset.json(),
            _ => None,
        };
        let Some(graph) = graph.filter(|g| self.filter.keeps_node(g)) else {
            return out;
        };
        let graph = self.filter.strip(graph);

        let mut strings = BTreeSet::new();
        collect_strings(&graph, &mut strings);

        let mut classes = BTreeSet::new();
        collect_class_names(&graph, &mut classes);
        for class in &classes {
            for desc in self.class_chain(class) {
                collect_strings(&self.filter.strip(&desc.default_values), &mut strings);
            }
        }

        for s in &strings {
            for kind in REFERENCE_KINDS {
                if let Some(target) = self.assets.get(s, kind) {
                    if target.id() != asset.id() {
                        out.insert(target.id());
                    }
                }
            }
        }
        out
    }

    /// Decide which classes ship. See the module docs for the rules.
    pub fn retain_classes(&self) -> ClassRetention {
        let valid = self.valid_classes();

        let mut referenced = BTreeSet::new();
        for kind in [AssetKind::Scene, AssetKind::Prefab] {
            for asset in self.assets.list(Some(kind)) {
                if !self.filter.is_name_valid(&asset.name) {
                    continue;
                }
                let Some(graph) = asset.json().filter(|g| self.filter.keeps_node(g)) else {
                    continue;
                };
                collect_class_names(&self.filter.strip(graph), &mut referenced);
            }
        }

        let mut retained: BTreeSet<String> = BTreeSet::new();
        for name in &referenced {
            let mut current = Some(name.as_str());
            while let Some(class) = current {
                let Some(desc) = valid.get(class) else {
                    break;
                };
                if !retained.insert(class.to_string()) {
                    break;
                }
                current = desc.extends.as_deref();
            }
        }

        let mut warnings = Vec::new();
        let mut queue: Vec<String> = retained.iter().cloned().collect();
        while let Some(name) = queue.pop() {
            let Some(desc) = valid.get(name.as_str()) else {
                continue;
            };
            for required in &desc.required_components {
                if valid.contains_key(required.as_str()) {
                    if retained.insert(required.clone()) {
                        queue.push(required.clone());
                    }
                } else {
                    let warning = format!(
                        "{}.requiredComponents contains unknown component: {}",
                        name, required
                    );
                    tracing::warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }
        warnings.sort();

        let pruned: Vec<String> = valid
            .keys()
            .filter(|name| !retained.contains(**name))
            .map(|name| name.to_string())
            .collect();
        for name in &pruned {
            tracing::debug!("Pruned unreferenced class {}", name);
        }

        let retained = retained
            .iter()
            .filter_map(|name| valid.get(name.as_str()))
            .map(|desc| ClassManifestEntry {
                class_name: desc.class_name.clone(),
                source_path: desc.source_path.clone(),
                default_values: self.filter.strip(&desc.default_values),
            })
            .collect();

        ClassRetention {
            retained,
            pruned,
            warnings,
        }
    }

    /// Non-excluded classes by name.
    fn valid_classes(&self) -> BTreeMap<&'a str, &'a ClassDesc> {
        self.assets
            .list(Some(AssetKind::Class))
            .into_iter()
            .filter(|asset| {
                self.filter.is_name_valid(&asset.name)
                    && self.filter.is_name_valid(asset.file_name.as_str())
            })
            .filter_map(|asset| asset.class_desc())
            .map(|desc| (desc.class_name.as_str(), desc))
            .collect()
    }

    /// `class` followed by its known, non-excluded ancestors.
    fn class_chain(&self, class: &str) -> Vec<&'a ClassDesc> {
        let mut chain = Vec::new();
        let mut seen = BTreeSet::new();
        let mut current = Some(class.to_string());
        while let Some(name) = current {
            if !seen.insert(name.clone()) || !self.filter.is_name_valid(&name) {
                break;
            }
            let Some(desc) = self
                .assets
                .get(&name, AssetKind::Class)
                .and_then(AssetFile::class_desc)
            else {
                break;
            };
            chain.push(desc);
            current = desc.extends.clone();
        }
        chain
    }
}
