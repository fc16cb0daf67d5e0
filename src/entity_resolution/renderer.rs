use askama::Template;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};

use crate::entity_resolution::graph::{
    EntityGraph, GraphEdge, GraphNode, SAME_ADDRESS_COLOR, SAME_ADDRESS_RELATIONSHIP,
};
use crate::models::Result;

#[derive(Template)]
#[template(path = "graph.html")]
struct GraphTemplate {
    nodes_json: String,
    edges_json: String,
    options_json: String,
    height: String,
    width: String,
}

#[derive(Debug, Serialize)]
struct VisNode {
    id: String,
    label: String,
    title: String,
    color: String,
    font: VisFont,
}

#[derive(Debug, Serialize)]
struct VisFont {
    color: &'static str,
    size: u32,
}

#[derive(Debug, Serialize)]
struct VisEdge {
    from: String,
    to: String,
    color: String,
    label: String,
    arrows: &'static str,
}

pub struct RenderedNetwork {
    pub html: String,
    pub component_count: usize,
}

/// Weakly-connected components in first-seen node order, each component
/// listing its members in traversal order. Deterministic for a given input.
pub fn connected_components(graph: &DiGraph<GraphNode, GraphEdge>) -> Vec<Vec<NodeIndex>> {
    let mut visited: HashSet<NodeIndex> = HashSet::new();
    let mut components = Vec::new();

    for start in graph.node_indices() {
        if visited.contains(&start) {
            continue;
        }
        let mut members = Vec::new();
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            members.push(node);
            for neighbor in graph.neighbors_undirected(node) {
                if !visited.contains(&neighbor) {
                    stack.push(neighbor);
                }
            }
        }
        components.push(members);
    }
    components
}

/// Deterministic color for a component index, so reruns over identical
/// input color the plot identically.
pub fn component_color(index: usize) -> String {
    format!(
        "#{:02x}{:02x}{:02x}",
        index % 256,
        (index * 3) % 256,
        (index * 5) % 256
    )
}

/// Renders the graph as a self-contained vis-network HTML page. Nodes and
/// non-address edges take their component's color; same-address edges keep
/// their fixed red so they stand out across components.
pub fn render_network(entity_graph: &EntityGraph) -> Result<RenderedNetwork> {
    let graph = entity_graph.graph();
    let components = connected_components(graph);

    let mut component_of: HashMap<NodeIndex, usize> = HashMap::new();
    for (index, members) in components.iter().enumerate() {
        for &member in members {
            component_of.insert(member, index);
        }
    }

    let mut nodes = Vec::with_capacity(graph.node_count());
    for (index, members) in components.iter().enumerate() {
        let color = component_color(index);
        for &member in members {
            let node = &graph[member];
            nodes.push(VisNode {
                id: node.name.clone(),
                label: node.label.clone(),
                title: node.title.clone(),
                color: color.clone(),
                font: VisFont {
                    color: "black",
                    size: 10,
                },
            });
        }
    }

    let mut edges = Vec::with_capacity(graph.edge_count());
    for edge in graph.edge_references() {
        let weight = edge.weight();
        let color = if weight.relationship == SAME_ADDRESS_RELATIONSHIP {
            weight
                .color
                .clone()
                .unwrap_or_else(|| SAME_ADDRESS_COLOR.to_string())
        } else {
            let index = component_of.get(&edge.source()).copied().unwrap_or(0);
            component_color(index)
        };
        edges.push(VisEdge {
            from: graph[edge.source()].name.clone(),
            to: graph[edge.target()].name.clone(),
            color,
            label: weight.label.clone(),
            arrows: "to",
        });
    }

    let template = GraphTemplate {
        nodes_json: serde_json::to_string(&nodes)?,
        edges_json: serde_json::to_string(&edges)?,
        options_json: layout_options().to_string(),
        height: "1200px".to_string(),
        width: "100%".to_string(),
    };
    let html = template
        .render()
        .map_err(|e| format!("failed to render the graph template: {}", e))?;

    Ok(RenderedNetwork {
        html,
        component_count: components.len(),
    })
}

fn layout_options() -> serde_json::Value {
    json!({
        "physics": {
            "enabled": true,
            "solver": "forceAtlas2Based",
            "forceAtlas2Based": {
                "gravitationalConstant": -50,
                "centralGravity": 0.01,
                "springLength": 100,
                "springConstant": 0.08,
                "damping": 0.4,
                "avoidOverlap": 1
            },
            "stabilization": { "enabled": true, "iterations": 1000 }
        },
        "edges": {
            "smooth": { "enabled": true, "type": "dynamic" }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_resolution::graph::build_graph;
    use crate::entity_resolution::preparer::{EntityType, PreparedRecord};

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

    #[test]
    fn component_colors_are_deterministic() {
        assert_eq!(component_color(0), "#000000");
        assert_eq!(component_color(1), "#010305");
        assert_eq!(component_color(2), "#02060a");
        assert_eq!(component_color(300), "#2c84dc");
        assert_eq!(component_color(0), component_color(0));
    }

    #[test]
    fn disconnected_clusters_form_separate_components() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, None),
            record("B Corp", "Jane Doe", EntityType::Owner, None),
            record("C Corp", "Eve Poe", EntityType::Owner, None),
        ];
        let graph = build_graph(&records);
        let components = connected_components(graph.graph());

        assert_eq!(components.len(), 2);
        // First component is the one containing the first-inserted node.
        assert!(components[0].contains(&graph.node_index("Jane Doe").unwrap()));
        assert!(components[1].contains(&graph.node_index("C Corp").unwrap()));
    }

    #[test]
    fn same_address_edges_join_components_before_coloring() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, Some("1 Main St")),
            record("B Corp", "Eve Poe", EntityType::Owner, Some("1 Main St")),
        ];
        let graph = build_graph(&records);
        let components = connected_components(graph.graph());
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn rendered_page_embeds_nodes_edges_and_layout() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, Some("1 Main St")),
            record("B Corp", "Eve Poe", EntityType::RegisteredAgent, Some("1 Main St")),
            record("C Corp", "Ada Moe", EntityType::Owner, None),
        ];
        let graph = build_graph(&records);
        let rendered = render_network(&graph).unwrap();

        assert_eq!(rendered.component_count, 2);
        assert!(rendered.html.contains("vis.Network"));
        assert!(rendered.html.contains("Company: A Corp"));
        assert!(rendered.html.contains("Name: Jane Doe | Relationship: Owner"));
        assert!(rendered.html.contains("Same Address"));
        assert!(rendered.html.contains("\"color\":\"red\""));
        assert!(rendered.html.contains("forceAtlas2Based"));
        assert!(rendered.html.contains("1200px"));
    }

    #[test]
    fn rendering_twice_produces_identical_html() {
        let records = vec![
            record("A Corp", "Jane Doe", EntityType::Owner, Some("1 Main St")),
            record("B Corp", "Eve Poe", EntityType::Owner, Some("1 Main St")),
        ];
        let graph = build_graph(&records);
        let first = render_network(&graph).unwrap();
        let second = render_network(&graph).unwrap();
        assert_eq!(first.html, second.html);
    }
}
