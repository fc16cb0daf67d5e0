use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::entity_resolution::preparer::PreparedRecord;

pub const SAME_ADDRESS_RELATIONSHIP: &str = "same_address";
pub const SAME_ADDRESS_COLOR: &str = "red";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Entity,
    Company,
}

#[derive(Debug, Clone)]
pub struct GraphNode {
    pub name: String,
    pub kind: NodeKind,
    pub label: String,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct GraphEdge {
    pub relationship: String,
    pub label: String,
    /// Fixed color, set only on same-address edges. Everything else is
    /// colored per component at render time.
    pub color: Option<String>,
}

/// Directed entity-resolution graph. Node identity is the name string:
/// records naming the same entity or company land on the same node, which
/// is the resolution mechanism.
pub struct EntityGraph {
    graph: DiGraph<GraphNode, GraphEdge>,
    node_map: HashMap<String, NodeIndex>,
}

impl EntityGraph {
    fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    pub fn graph(&self) -> &DiGraph<GraphNode, GraphEdge> {
        &self.graph
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.node_map.get(name).copied()
    }

    pub fn same_address_edge_count(&self) -> usize {
        self.graph
            .edge_weights()
            .filter(|edge| edge.relationship == SAME_ADDRESS_RELATIONSHIP)
            .count()
    }

    /// Adds the node if its name is new, otherwise overwrites its
    /// attributes. Last write wins, matching repeated-record semantics.
    fn upsert_node(&mut self, name: &str, kind: NodeKind, label: String, title: String) -> NodeIndex {
        match self.node_map.get(name) {
            Some(&index) => {
                let node = &mut self.graph[index];
                node.kind = kind;
                node.label = label;
                node.title = title;
                index
            }
            None => {
                let index = self.graph.add_node(GraphNode {
                    name: name.to_string(),
                    kind,
                    label,
                    title,
                });
                self.node_map.insert(name.to_string(), index);
                index
            }
        }
    }
}

/// Builds the graph in one pass over the prepared records, then links
/// companies sharing a principal address.
pub fn build_graph(records: &[PreparedRecord]) -> EntityGraph {
    let mut entity_graph = EntityGraph::new();

    // (company, address) pairs in first-seen order, deduplicated.
    let mut company_addresses: Vec<(NodeIndex, String)> = Vec::new();
    let mut seen_addresses: HashSet<(String, String)> = HashSet::new();

    for record in records {
        let entity_index = entity_graph.upsert_node(
            &record.entity_name,
            NodeKind::Entity,
            record.entity_name.clone(),
            format!(
                "Name: {} | Relationship: {}",
                record.entity_name, record.entity_type
            ),
        );
        let company_index = entity_graph.upsert_node(
            &record.company_name,
            NodeKind::Company,
            format!("Company: {}", record.company_name),
            format!("Company ID: {}", record.company_id),
        );

        let relationship = record.entity_type.label().to_string();
        entity_graph.graph.update_edge(
            entity_index,
            company_index,
            GraphEdge {
                label: relationship.clone(),
                relationship,
                color: None,
            },
        );

        if let Some(address) = &record.principal_address {
            let key = (record.company_name.clone(), address.clone());
            if seen_addresses.insert(key) {
                company_addresses.push((company_index, address.clone()));
            }
        }
    }

    add_same_address_edges(&mut entity_graph.graph, &company_addresses);

    info!(
        "🕸️  Graph built: {} nodes, {} edges ({} same-address)",
        entity_graph.graph.node_count(),
        entity_graph.graph.edge_count(),
        entity_graph.same_address_edge_count()
    );
    entity_graph
}

/// Pairwise pass over the addressed companies. Quadratic, which is fine at
/// the expected scale of hundreds to low thousands of companies per crawl.
fn add_same_address_edges(
    graph: &mut DiGraph<GraphNode, GraphEdge>,
    company_addresses: &[(NodeIndex, String)],
) {
    for i in 0..company_addresses.len() {
        for j in (i + 1)..company_addresses.len() {
            let (first, first_address) = &company_addresses[i];
            let (second, second_address) = &company_addresses[j];
            if first_address != second_address {
                continue;
            }
            // One edge per unordered pair, and never on top of an existing
            // edge in either direction.
            if graph.find_edge(*first, *second).is_some()
                || graph.find_edge(*second, *first).is_some()
            {
                continue;
            }
            graph.add_edge(
                *first,
                *second,
                GraphEdge {
                    relationship: SAME_ADDRESS_RELATIONSHIP.to_string(),
                    label: "Same Address".to_string(),
                    color: Some(SAME_ADDRESS_COLOR.to_string()),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_resolution::preparer::EntityType;
    use petgraph::visit::EdgeRef;

    fn record(
        company: &str,
        entity: &str,
        entity_type: EntityType,
        address: Option<&str>,
    ) -> PreparedRecord {
        PreparedRecord {
            company_id: format!("id-{}", company),
            company_name: company.to_string(),
            entity_name: entity.to_string(),
            entity_type,
            principal_address: address.map(str::to_string),
        }
    }

    fn same_address_pairs(graph: &EntityGraph) -> Vec<(String, String)> {
        graph
            .graph()
            .edge_references()
            .filter(|edge| edge.weight().relationship == SAME_ADDRESS_RELATIONSHIP)
            .map(|edge| {
                (
                    graph.graph()[edge.source()].name.clone(),
                    graph.graph()[edge.target()].name.clone(),
                )
            })
            .collect()
    }

    #[test]
    fn links_entities_to_their_companies() {
        let records = vec![record("Acme LLC", "Jane Doe", EntityType::Owner, None)];
        let graph = build_graph(&records);

        assert_eq!(graph.graph().node_count(), 2);
        assert_eq!(graph.graph().edge_count(), 1);

        let entity = graph.node_index("Jane Doe").unwrap();
        let company = graph.node_index("Acme LLC").unwrap();
        let edge = graph.graph().find_edge(entity, company).unwrap();
        assert_eq!(graph.graph()[edge].label, "Owner");

        assert_eq!(graph.graph()[entity].label, "Jane Doe");
        assert_eq!(
            graph.graph()[entity].title,
            "Name: Jane Doe | Relationship: Owner"
        );
        assert_eq!(graph.graph()[company].label, "Company: Acme LLC");
        assert_eq!(graph.graph()[company].title, "Company ID: id-Acme LLC");
    }

    #[test]
    fn shared_names_merge_into_one_node() {
        let records = vec![
            record("Acme LLC", "Jane Doe", EntityType::Owner, None),
            record("Beta Inc", "Jane Doe", EntityType::RegisteredAgent, None),
        ];
        let graph = build_graph(&records);

        // Jane Doe, Acme LLC, Beta Inc.
        assert_eq!(graph.graph().node_count(), 3);
        assert_eq!(graph.graph().edge_count(), 2);

        // Last record wins the node attributes.
        let entity = graph.node_index("Jane Doe").unwrap();
        assert_eq!(
            graph.graph()[entity].title,
            "Name: Jane Doe | Relationship: Registered Agent"
        );
    }

    #[test]
    fn repeated_pairs_overwrite_the_edge() {
        let records = vec![
            record("Acme LLC", "Jane Doe", EntityType::Owner, None),
            record("Acme LLC", "Jane Doe", EntityType::Owner, None),
        ];
        let graph = build_graph(&records);
        assert_eq!(graph.graph().edge_count(), 1);
    }

    #[test]
    fn same_address_links_exactly_the_sharing_companies() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, Some("1 Main St")),
            record("B Corp", "Bob Roe", EntityType::Owner, Some("1 Main St")),
            record("C Corp", "Eve Poe", EntityType::Owner, Some("2 Oak Ave")),
        ];
        let graph = build_graph(&records);

        let pairs = same_address_pairs(&graph);
        assert_eq!(pairs, vec![("A Corp".to_string(), "B Corp".to_string())]);

        let edge = graph
            .graph()
            .find_edge(
                graph.node_index("A Corp").unwrap(),
                graph.node_index("B Corp").unwrap(),
            )
            .unwrap();
        assert_eq!(graph.graph()[edge].label, "Same Address");
        assert_eq!(graph.graph()[edge].color.as_deref(), Some("red"));
    }

    #[test]
    fn existing_edge_in_either_direction_blocks_the_address_link() {
        // "Beta Inc" is both a company and the owner of Acme LLC, so the
        // ownership edge already connects the two company nodes.
        let records = vec![
            record("Acme LLC", "Beta Inc", EntityType::Owner, Some("1 Main St")),
            record("Beta Inc", "Jane Doe", EntityType::Owner, Some("1 Main St")),
        ];
        let graph = build_graph(&records);
        assert!(same_address_pairs(&graph).is_empty());
    }

    #[test]
    fn duplicate_company_address_rows_create_one_edge() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, Some("1 Main St")),
            record("A Corp", "Bob Roe", EntityType::Owner, Some("1 Main St")),
            record("B Corp", "Eve Poe", EntityType::Owner, Some("1 Main St")),
        ];
        let graph = build_graph(&records);
        assert_eq!(same_address_pairs(&graph).len(), 1);
    }

    #[test]
    fn rebuilding_from_the_same_records_is_idempotent() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, Some("1 Main St")),
            record("B Corp", "Jane Doe", EntityType::RegisteredAgent, Some("1 Main St")),
            record("C Corp", "Eve Poe", EntityType::CommercialRegisteredAgent, None),
        ];

        let first = build_graph(&records);
        let second = build_graph(&records);

        assert_eq!(first.graph().node_count(), second.graph().node_count());
        assert_eq!(first.graph().edge_count(), second.graph().edge_count());

        let edges = |g: &EntityGraph| -> Vec<(String, String, String)> {
            g.graph()
                .edge_references()
                .map(|edge| {
                    (
                        g.graph()[edge.source()].name.clone(),
                        g.graph()[edge.target()].name.clone(),
                        edge.weight().label.clone(),
                    )
                })
                .collect()
        };
        assert_eq!(edges(&first), edges(&second));
    }

    #[test]
    fn missing_addresses_never_link() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, None),
            record("B Corp", "Bob Roe", EntityType::Owner, None),
        ];
        let graph = build_graph(&records);
        assert!(same_address_pairs(&graph).is_empty());
    }
}
