use crate::config::{CapacityConfig, ConditionRecord, ConditionSet, Formula};
use crate::error::ConfigError;
use crate::node::{
    Node, SharedReferenceTemplate, Table, TableConfig, TemplateUsage, Value,
};
use crate::store::{NodeStore, SubmissionStore, TableStore, TemplateStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One stored submission value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: String,
    pub node_id: String,
    pub value: Value,
}

/// A stored table capacity: the config plus its identity and owning node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfigRecord {
    pub id: String,
    pub node_id: String,
    pub config: TableConfig,
}

/// An in-memory dataset implementing every collaborator trait.
///
/// Production deployments back the store traits with a database; this type
/// exists for tests, fixtures and the CLI, and is the reference
/// implementation of the template authoring consistency rules. Loadable
/// from a single JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub formulas: Vec<Formula>,
    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,
    #[serde(default)]
    pub table_configs: Vec<TableConfigRecord>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub templates: Vec<SharedReferenceTemplate>,
    #[serde(default)]
    pub submissions: Vec<SubmissionRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dataset from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let data = serde_json::from_str(&content)?;
        Ok(data)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Records a submission value, replacing any previous entry for the pair.
    pub fn set_value(
        &mut self,
        submission_id: impl Into<String>,
        node_id: impl Into<String>,
        value: impl Into<Value>,
    ) {
        let (submission_id, node_id, value) = (submission_id.into(), node_id.into(), value.into());
        if let Some(existing) = self
            .submissions
            .iter_mut()
            .find(|r| r.submission_id == submission_id && r.node_id == node_id)
        {
            existing.value = value;
        } else {
            self.submissions.push(SubmissionRecord {
                submission_id,
                node_id,
                value,
            });
        }
    }

    // --- Template authoring -------------------------------------------------
    //
    // Invariant maintained by every operation below: a template's
    // `usage_count` equals the number of live nodes whose
    // `shared_reference_ids` contain it, and `usages` lists those nodes.

    /// Links a node to a template, marking the node as a shared reference.
    pub fn link_template(&mut self, node_id: &str, template_id: &str) -> Result<(), ConfigError> {
        if !self.templates.iter().any(|t| t.id == template_id) {
            return Err(ConfigError::UnknownTemplate(template_id.to_string()));
        }
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| ConfigError::UnknownNode(node_id.to_string()))?;
        if !node.shared_reference_ids.iter().any(|id| id == template_id) {
            node.shared_reference_ids.push(template_id.to_string());
        }
        node.is_shared_reference = true;
        self.refresh_template_usages(template_id);
        Ok(())
    }

    /// Unlinks a node from a template. When the node's reference list
    /// empties, the node falls back to independent-copy mode.
    pub fn unlink_template(&mut self, node_id: &str, template_id: &str) -> Result<(), ConfigError> {
        let node = self
            .nodes
            .iter_mut()
            .find(|n| n.id == node_id)
            .ok_or_else(|| ConfigError::UnknownNode(node_id.to_string()))?;
        node.shared_reference_ids.retain(|id| id != template_id);
        if node.shared_reference_ids.is_empty() {
            node.is_shared_reference = false;
        }
        self.refresh_template_usages(template_id);
        Ok(())
    }

    /// Deletes a template. Refused while it is still in use unless
    /// `confirmed`; a confirmed delete cascade-clears every referencing
    /// node rather than leaving dangling references.
    pub fn delete_template(&mut self, template_id: &str, confirmed: bool) -> Result<(), ConfigError> {
        if !self.templates.iter().any(|t| t.id == template_id) {
            return Err(ConfigError::UnknownTemplate(template_id.to_string()));
        }
        let usage_count = self.template_usage(template_id);
        if usage_count > 0 && !confirmed {
            return Err(ConfigError::TemplateInUse {
                template_id: template_id.to_string(),
                usage_count,
            });
        }
        for node in &mut self.nodes {
            node.shared_reference_ids.retain(|id| id != template_id);
            if node.shared_reference_ids.is_empty() {
                node.is_shared_reference = false;
            }
        }
        self.templates.retain(|t| t.id != template_id);
        Ok(())
    }

    /// Number of live nodes currently linking to a template.
    pub fn template_usage(&self, template_id: &str) -> usize {
        self.nodes
            .iter()
            .filter(|n| n.shared_reference_ids.iter().any(|id| id == template_id))
            .count()
    }

    fn refresh_template_usages(&mut self, template_id: &str) {
        let usages: Vec<TemplateUsage> = self
            .nodes
            .iter()
            .filter(|n| n.shared_reference_ids.iter().any(|id| id == template_id))
            .map(|n| TemplateUsage {
                tree_id: n.tree_id.clone(),
                path: self.node_path(&n.id),
            })
            .collect();
        if let Some(template) = self.templates.iter_mut().find(|t| t.id == template_id) {
            template.usage_count = usages.len();
            template.usages = usages;
        }
    }

    /// Label path from the root to a node, for usage audits. Tolerates
    /// missing parents and bails out of parent cycles.
    pub fn node_path(&self, node_id: &str) -> String {
        let mut labels = Vec::new();
        let mut current = self.nodes.iter().find(|n| n.id == node_id);
        let mut hops = 0;
        while let Some(node) = current {
            labels.push(node.label.clone());
            hops += 1;
            if hops > 64 {
                break;
            }
            current = node
                .parent_id
                .as_deref()
                .and_then(|pid| self.nodes.iter().find(|n| n.id == pid));
        }
        labels.reverse();
        labels.join(" / ")
    }

    /// The node's own capacity, falling back to its default capacity
    /// records with formula > condition > table priority.
    fn effective_capacity(&self, node: &Node) -> Option<CapacityConfig> {
        if node.capacity.is_some() {
            return node.capacity.clone();
        }
        if let Some(f) = self.formulas.iter().find(|f| f.node_id == node.id) {
            return Some(CapacityConfig::Formula(f.clone()));
        }
        if let Some(c) = self.conditions.iter().find(|c| c.node_id == node.id) {
            return Some(CapacityConfig::Condition(c.set.clone()));
        }
        if let Some(t) = self.table_configs.iter().find(|t| t.node_id == node.id) {
            return Some(CapacityConfig::Table(t.config.clone()));
        }
        None
    }
}

impl NodeStore for Dataset {
    fn node(&self, node_id: &str) -> Option<Node> {
        self.nodes.iter().find(|n| n.id == node_id).map(|n| {
            let mut node = n.clone();
            node.capacity = self.effective_capacity(n);
            node
        })
    }

    fn formula(&self, formula_id: &str) -> Option<Formula> {
        self.formulas.iter().find(|f| f.id == formula_id).cloned()
    }

    fn condition(&self, condition_id: &str) -> Option<ConditionSet> {
        self.conditions
            .iter()
            .find(|c| c.id == condition_id)
            .map(|c| c.set.clone())
    }

    fn table_config(&self, config_id: &str) -> Option<TableConfig> {
        self.table_configs
            .iter()
            .find(|t| t.id == config_id)
            .map(|t| t.config.clone())
    }

    fn children(&self, node_id: &str) -> Vec<Node> {
        self.nodes
            .iter()
            .filter(|n| n.parent_id.as_deref() == Some(node_id))
            .cloned()
            .collect()
    }
}

impl SubmissionStore for Dataset {
    fn value(&self, submission_id: &str, node_id: &str) -> Option<Value> {
        self.submissions
            .iter()
            .find(|r| r.submission_id == submission_id && r.node_id == node_id)
            .map(|r| r.value.clone())
    }
}

impl TableStore for Dataset {
    fn table(&self, name: &str) -> Option<Table> {
        self.tables.iter().find(|t| t.name == name).cloned()
    }
}

impl TemplateStore for Dataset {
    fn template(&self, template_id: &str) -> Option<SharedReferenceTemplate> {
        self.templates.iter().find(|t| t.id == template_id).cloned()
    }
}
