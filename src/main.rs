use eventgraph::{attributes, EventKind, Graph, GraphEvent};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Eventgraph v{}", eventgraph::version());
    println!("==========================================");
    println!();

    let mut graph = Graph::new();

    // Print every event in its wire form
    for kind in EventKind::ALL {
        graph.on(kind, |_, event| {
            println!("  {}", serde_json::to_string(event)?);
            Ok(())
        });
    }

    // Tag every new edge with its creation order (re-entrant mutation)
    graph.on(EventKind::EdgeAdded, |graph, event| {
        if let GraphEvent::EdgeAdded { key, .. } = event {
            let rank = graph.size() as i64;
            graph.set_edge_attribute(key, "rank", rank)?;
        }
        Ok(())
    });

    demo_structure(&mut graph)?;
    demo_attributes(&mut graph)?;

    println!("\n=== Clear ===");
    graph.clear()?;
    info!(order = graph.order(), size = graph.size(), "graph cleared");

    Ok(())
}

fn demo_structure(graph: &mut Graph) -> anyhow::Result<()> {
    println!("=== Demo 1: Structure ===");

    graph.add_node("John", attributes([("age", 34)]))?;
    graph.add_node("Thomas", attributes([("age", 28)]))?;
    graph.add_node("Martha", attributes([("age", 41)]))?;

    graph.add_edge_with_key("J->T", "John", "Thomas", attributes([("weight", 1)]))?;
    graph.add_undirected_edge("Thomas", "Martha", attributes([("type", "KNOWS")]))?;
    graph.add_directed_edge("Martha", "John", attributes([("type", "FOLLOWS")]))?;

    println!("\nDropping Thomas (cascades to incident edges):");
    graph.drop_node("Thomas")?;

    println!("\nGraph Statistics:");
    println!("  Total nodes: {}", graph.order());
    println!("  Total edges: {}", graph.size());
    Ok(())
}

fn demo_attributes(graph: &mut Graph) -> anyhow::Result<()> {
    println!("\n=== Demo 2: Attributes ===");

    graph.set_attribute("name", "Awesome graph")?;
    graph.replace_attributes(attributes([("name", "Shitty graph")]))?;
    graph.merge_attributes(attributes([("author", "John")]))?;
    graph.remove_attribute("name")?;

    graph.set_node_attribute("John", "eyes", "blue")?;
    graph.merge_node_attributes("John", attributes([("city", "Paris")]))?;
    graph.remove_node_attribute("John", "eyes")?;

    println!("\nGraph attributes: {}", serde_json::to_string(graph.attributes())?);
    println!("John: {}", serde_json::to_string(graph.node_attributes("John")?)?);
    Ok(())
}
