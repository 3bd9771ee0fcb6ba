/// Writing a small social graph
///
/// This example demonstrates:
/// 1. Describing vertex and edge types
/// 2. Writing vertex chunks with labels
/// 3. Writing adjacency lists, offsets and edge properties
/// 4. Saving the graph descriptor
///
/// Run with `cargo run --example dump -- <output dir>`, then read the result
/// back with the `read` example.
use anyhow::{Context, Result};
use rust_graphar::{
    init_logging, AdjListType, AdjacentList, DataType, Edge, EdgeInfo, EdgesBuilder, EngineConfig,
    FileType, GraphInfo, InfoVersion, Property, PropertyGroup, Vertex, VertexInfo,
    VerticesBuilder,
};
use std::path::PathBuf;

const PEOPLE: [(&str, i32, &str, &[&str]); 5] = [
    ("Alice", 30, "Beijing", &["employee"]),
    ("Bob", 25, "Shanghai", &["student"]),
    ("Carol", 28, "Shenzhen", &["employee", "manager"]),
    ("David", 35, "Beijing", &["employee"]),
    ("Eve", 19, "Hangzhou", &["student"]),
];

const KNOWS: [(i64, i64, i32); 6] = [
    (0, 1, 2015),
    (0, 2, 2018),
    (1, 2, 2020),
    (2, 3, 2012),
    (3, 0, 2019),
    (4, 1, 2023),
];

fn main() -> Result<()> {
    let config = EngineConfig::from_env()?;
    init_logging(&config.logging)?;

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("graphar_demo"));
    std::fs::create_dir_all(&output)
        .with_context(|| format!("creating {}", output.display()))?;

    println!("=== GraphAr - Dump Example ===\n");

    // Example 1: Describing the schema
    println!("1. Describing the schema");
    println!("{}", "-".repeat(50));

    let person = VertexInfo::new(
        "person",
        2,
        vec![
            PropertyGroup::new(
                vec![
                    Property::simple("id", DataType::Int64, true),
                    Property::simple("name", DataType::String, false),
                ],
                FileType::Parquet,
                "",
            )?,
            PropertyGroup::new(
                vec![
                    Property::simple("age", DataType::Int32, false),
                    Property::simple("city", DataType::String, false),
                ],
                FileType::Csv,
                "",
            )?,
        ],
        vec!["employee".into(), "manager".into(), "student".into()],
        "",
        InfoVersion::default(),
    )?;
    let knows = EdgeInfo::new(
        "person",
        "knows",
        "person",
        4,
        2,
        2,
        true,
        vec![
            AdjacentList::new(AdjListType::OrderedBySource, FileType::Parquet, ""),
            AdjacentList::new(AdjListType::OrderedByDest, FileType::Parquet, ""),
        ],
        vec![PropertyGroup::new(
            vec![Property::simple("since", DataType::Int32, false)],
            FileType::Json,
            "",
        )?],
        "",
        InfoVersion::default(),
    )?;
    println!("{}", person.dump()?);
    println!("{}", knows.dump()?);

    // Example 2: Writing vertices
    println!("2. Writing vertices");
    println!("{}", "-".repeat(50));

    let mut vertices = VerticesBuilder::from_config(person.clone(), &output, 0, &config.builder)?;
    for (name, age, city, labels) in PEOPLE {
        let id = vertices.next_index();
        let mut vertex = Vertex::new()
            .with_property("id", id)
            .with_property("name", name)
            .with_property("age", age)
            .with_property("city", city);
        for label in labels {
            vertex.add_label(*label);
        }
        vertices.add_vertex(vertex)?;
        println!("  person {} -> {}", id, name);
    }
    vertices.dump()?;
    println!();

    // Example 3: Writing edges
    println!("3. Writing edges");
    println!("{}", "-".repeat(50));

    let people = PEOPLE.len() as i64;
    let mut edges = EdgesBuilder::from_config(knows.clone(), &output, people, people, &config.builder)?;
    for (src, dst, since) in KNOWS {
        edges.add_edge(Edge::new(src, dst).with_property("since", since))?;
        println!("  {} knows {} since {}", PEOPLE[src as usize].0, PEOPLE[dst as usize].0, since);
    }
    edges.dump()?;
    println!();

    // Example 4: Saving the descriptor
    println!("4. Saving the graph descriptor");
    println!("{}", "-".repeat(50));

    let prefix = format!("{}/", output.canonicalize()?.display());
    let graph = GraphInfo::new(
        "social",
        vec![person],
        vec![knows],
        vec![],
        prefix,
        InfoVersion::default(),
    )?;
    let descriptor = output.join("social.graph.yml");
    graph.save(&descriptor)?;
    println!("Saved {}", descriptor.display());

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
