//! Type dependency graph construction for visualization tooling.
//!
//! Derived read-only from the assembly after scanning; the reachability
//! engine itself runs on the worklist in [`crate::scan`], not on this
//! graph.

use std::collections::HashMap;

use petgraph::graphmap::DiGraphMap;

use crate::assembly::{Assembly, Operand, TypeDef, TypeId, TypeRef};
use crate::classify::UnusedTypes;
use crate::index::TypeIndex;

/// Builds the dependency graph over every same-assembly edge of the
/// live types. External references carry no node here.
pub fn build_type_graph(assembly: &Assembly, types: &TypeIndex) -> DiGraphMap<TypeId, ()> {
    let mut g = DiGraphMap::new();

    for id in assembly.live_types() {
        g.add_node(id);
    }

    for id in assembly.live_types() {
        let mut targets = Vec::new();
        for r in type_edges(assembly.type_def(id)) {
            internal_targets(types, r, &mut targets);
        }
        for target in targets {
            if target != id {
                g.add_edge(id, target, ());
            }
        }
    }

    g
}

/// Export the dependency graph in visualizer-compatible JSON format.
///
/// Output shape:
/// ```json
/// {
///   "nodes": [{ "id": 0, "name": "Acme.Widget", "dead": false }],
///   "edges": [{ "from": 0, "to": 1 }]
/// }
/// ```
pub fn type_graph_to_json(
    assembly: &Assembly,
    graph: &DiGraphMap<TypeId, ()>,
    unused: &UnusedTypes,
) -> serde_json::Value {
    // name -> numeric ID mapping, sorted for deterministic output
    let mut ids: Vec<TypeId> = assembly.live_types();
    ids.sort_by(|&a, &b| assembly.type_def(a).name.cmp(&assembly.type_def(b).name));
    let numeric: HashMap<TypeId, usize> = ids.iter().enumerate().map(|(i, &t)| (t, i)).collect();

    let nodes: Vec<serde_json::Value> = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| {
            let name = &assembly.type_def(id).name;
            serde_json::json!({
                "id": i,
                "name": name,
                "dead": unused.contains_name(name),
            })
        })
        .collect();

    let mut edges: Vec<serde_json::Value> = Vec::new();
    for &from in &ids {
        for to in graph.neighbors(from) {
            if let (Some(&f), Some(&t)) = (numeric.get(&from), numeric.get(&to)) {
                edges.push(serde_json::json!({ "from": f, "to": t }));
            }
        }
    }

    let dead_count = nodes
        .iter()
        .filter(|n| n["dead"].as_bool().unwrap_or(false))
        .count();

    serde_json::json!({
        "nodes": nodes,
        "edges": edges,
        "stats": {
            "total_types": ids.len(),
            "total_edges": edges.len(),
            "dead_types": dead_count,
        }
    })
}

fn type_edges(def: &TypeDef) -> Vec<&TypeRef> {
    let mut refs = Vec::new();
    refs.extend(def.base.iter());
    refs.extend(def.interfaces.iter());
    refs.extend(def.fields.iter().map(|f| &f.field_type));
    refs.extend(def.properties.iter().map(|p| &p.property_type));
    refs.extend(def.custom_attributes.iter().map(|a| &a.attribute_type));
    for method in &def.methods {
        refs.extend(method.parameters.iter());
        refs.push(&method.return_type);
        refs.extend(method.locals.iter());
        for instruction in &method.body {
            match &instruction.operand {
                Operand::Type(t) => refs.push(t),
                Operand::Method(m) => {
                    refs.push(&m.declaring_type);
                    refs.push(&m.return_type);
                    refs.extend(m.parameters.iter());
                    refs.extend(m.generic_args.iter());
                }
                Operand::Field(f) => {
                    refs.push(&f.declaring_type);
                    refs.push(&f.field_type);
                }
                Operand::None => {}
            }
        }
    }
    refs
}

fn internal_targets(types: &TypeIndex, r: &TypeRef, out: &mut Vec<TypeId>) {
    match r {
        TypeRef::Named(name) => {
            if let Some(id) = types.get(name) {
                out.push(id);
            }
        }
        TypeRef::External { .. } => {}
        TypeRef::Generic { definition, args } => {
            for arg in args {
                internal_targets(types, arg, out);
            }
            internal_targets(types, definition, out);
        }
    }
}
