/// Reading a graph written by the `dump` example
///
/// Run with `cargo run --example read -- <dir>/social.graph.yml`.
use anyhow::{Context, Result};
use rust_graphar::expression::{and, eq, gt, lit, prop};
use rust_graphar::{
    init_logging, AdjListType, EdgesCollection, EngineConfig, FilterMode, GraphInfo,
    VerticesCollection,
};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    let config = EngineConfig::from_env()?;
    init_logging(&config.logging)?;

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("graphar_demo/social.graph.yml"));
    let graph = Arc::new(
        GraphInfo::load(&path).with_context(|| format!("loading {}", path.display()))?,
    );

    println!("=== GraphAr - Read Example ===\n");

    // Example 1: Iterating vertices
    println!("1. Iterating vertices");
    println!("{}", "-".repeat(50));

    let people = VerticesCollection::from_config(&graph, "person", &config.reader)?;
    println!("{} people", people.len());
    let mut it = people.begin();
    while !it.is_end() {
        println!(
            "  {} {} ({}), labels {:?}",
            it.id(),
            it.property::<String>("name")?,
            it.property::<i32>("age")?,
            it.labels()?
        );
        it.next();
    }
    println!();

    // Example 2: Filtering by labels and properties
    println!("2. Filtering");
    println!("{}", "-".repeat(50));

    let employees = VerticesCollection::with_label(&graph, "person", "employee")?;
    println!("employees: {:?}", employees.ids().collect::<Vec<_>>());

    let expr = and(gt(prop("age"), lit(26)), eq(prop("city"), lit("Beijing")));
    for mode in [FilterMode::Pushdown, FilterMode::RowWise] {
        let people = VerticesCollection::make(&graph, "person")?.with_filter_mode(mode);
        let mut chunks = Vec::new();
        let ids = people.filter("age", &expr, None, Some(&mut chunks))?;
        println!("{} [{}]: ids {:?}, chunks {:?}", expr, mode, ids, chunks);
    }
    println!();

    // Example 3: Traversing edges
    println!("3. Traversing edges");
    println!("{}", "-".repeat(50));

    let knows = EdgesCollection::make(
        &graph,
        "person",
        "knows",
        "person",
        AdjListType::OrderedBySource,
        None,
    )?;
    println!("{} edges", knows.len());
    let mut it = knows.begin();
    while !it.is_end() {
        let edge = it.edge()?;
        println!("  {} -> {} since {}", edge.src(), edge.dst(), edge.property::<i32>("since")?);
        it.next();
    }

    let followers = EdgesCollection::make(
        &graph,
        "person",
        "knows",
        "person",
        AdjListType::OrderedByDest,
        None,
    )?;
    let mut it = followers.find_dst(2, &followers.begin())?;
    let mut sources = Vec::new();
    while !it.is_end() {
        sources.push(it.source()?);
        if !it.next_dst_with(2)? {
            break;
        }
    }
    println!("people who know 2: {:?}", sources);

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
