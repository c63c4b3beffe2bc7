use crate::config::CapacityConfig;
use crate::engine::Engine;
use crate::error::EvalFault;
use crate::node::Node;
use log::warn;

/// The effective definition used to evaluate a node, after shared-reference
/// resolution.
///
/// For a shared reference, the label and capacity come from the primary
/// template, but `value_node_id` stays the referencing node's own id:
/// templates are definitions, not value containers, so the live value is
/// always looked up at the concrete usage site.
#[derive(Debug, Clone)]
pub(crate) struct Effective {
    pub(crate) label: String,
    pub(crate) value_node_id: String,
    pub(crate) capacity: Option<CapacityConfig>,
}

impl<'a> Engine<'a> {
    /// Resolves a node to its effective definition.
    ///
    /// Non-reference nodes pass through unchanged. A shared reference with an
    /// empty id list is a configuration error (`DanglingReference`); a
    /// missing template is `UnresolvedReference`. Both are returned as data —
    /// the caller substitutes a placeholder, evaluation never aborts here.
    pub(crate) fn resolve_reference(&self, node: &Node) -> Result<Effective, EvalFault> {
        if !node.is_shared_reference {
            return Ok(Effective {
                label: node.label.clone(),
                value_node_id: node.id.clone(),
                capacity: node.capacity.clone(),
            });
        }

        let template_id = node.primary_reference().ok_or(EvalFault::DanglingReference {
            node_id: node.id.clone(),
        })?;

        match self.templates.template(template_id) {
            Some(template) => Ok(Effective {
                label: template.label,
                value_node_id: node.id.clone(),
                capacity: template.capacity.or_else(|| node.capacity.clone()),
            }),
            None => {
                warn!(
                    "node '{}' references missing template '{}'",
                    node.id, template_id
                );
                Err(EvalFault::UnresolvedReference {
                    reference_id: template_id.to_string(),
                    used_by: node.id.clone(),
                })
            }
        }
    }
}
