/// End-to-end tests
///
/// Build chunks with the builders, describe them with descriptors on disk,
/// then read them back through collections.
use rust_graphar::expression::{gt, lit, prop};
use rust_graphar::storage::arrow_convert::column_values;
use rust_graphar::types::chunk_count;
use rust_graphar::{
    AdjListType, AdjacentList, ChunkAddress, ChunkStore, DataType, EdgeInfo, EdgesBuilder,
    FileType, FilterMode, GraphError, GraphInfo, InfoVersion, Property, PropertyGroup, Value,
    Vertex, VertexInfo, VerticesBuilder, VerticesCollection,
};
use std::sync::Arc;
use tempfile::TempDir;

fn person(chunk_size: i64) -> VertexInfo {
    let group = PropertyGroup::new(
        vec![
            Property::simple("id", DataType::Int64, true),
            Property::simple("age", DataType::Int32, false),
        ],
        FileType::Parquet,
        "",
    )
    .unwrap();
    VertexInfo::new(
        "person",
        chunk_size,
        vec![group],
        vec![],
        "",
        InfoVersion::default(),
    )
    .unwrap()
}

fn knows() -> EdgeInfo {
    let since = PropertyGroup::new(
        vec![Property::simple("since", DataType::Date, false)],
        FileType::Csv,
        "",
    )
    .unwrap();
    EdgeInfo::new(
        "person",
        "knows",
        "person",
        4,
        2,
        2,
        true,
        vec![
            AdjacentList::new(AdjListType::OrderedBySource, FileType::Parquet, ""),
            AdjacentList::new(AdjListType::UnorderedByDest, FileType::Json, ""),
        ],
        vec![since],
        "",
        InfoVersion::default(),
    )
    .unwrap()
}

/// Save a graph over `dir` with an absolute prefix and load it back
fn save_and_load(dir: &TempDir, vertices: Vec<VertexInfo>, edges: Vec<EdgeInfo>) -> Arc<GraphInfo> {
    let prefix = format!("{}/", dir.path().display());
    let graph = GraphInfo::new(
        "social",
        vertices,
        edges,
        vec![],
        prefix,
        InfoVersion::default(),
    )
    .unwrap();
    let path = dir.path().join("social.graph.yml");
    graph.save(&path).unwrap();
    Arc::new(GraphInfo::load(&path).unwrap())
}

fn add_people(builder: &mut VerticesBuilder, ages: &[i32]) -> Vec<i64> {
    ages.iter()
        .map(|age| {
            let id = builder.next_index();
            builder
                .add_vertex(
                    Vertex::new()
                        .with_property("id", id)
                        .with_property("age", *age),
                )
                .unwrap()
        })
        .collect()
}

/// Test the three-person walkthrough from build to filtered read
#[test]
fn test_build_and_query_people() {
    let dir = TempDir::new().unwrap();
    let mut builder = VerticesBuilder::new(person(2), dir.path(), 0).unwrap();
    assert_eq!(add_people(&mut builder, &[10, 20, 30]), vec![0, 1, 2]);
    builder.dump().unwrap();

    let graph = save_and_load(&dir, vec![person(2)], vec![]);
    let info = graph.vertex_info("person").unwrap();
    let group = info.property_group("age").unwrap();
    let store = ChunkStore::for_graph(&graph).unwrap();
    let chunk0 = store.read_vertex_column(info, group, "age", 0).unwrap();
    let chunk1 = store.read_vertex_column(info, group, "age", 1).unwrap();
    assert_eq!(
        column_values(chunk0.as_ref()).unwrap(),
        vec![Value::Int32(10), Value::Int32(20)]
    );
    assert_eq!(column_values(chunk1.as_ref()).unwrap(), vec![Value::Int32(30)]);

    let vertices = VerticesCollection::make(&graph, "person").unwrap();
    assert_eq!(vertices.len(), 3);
    assert_eq!(vertices.find(2).property::<i32>("age").unwrap(), 30);
    assert!(vertices.find(3).is_end());

    for mode in [FilterMode::Pushdown, FilterMode::RowWise] {
        let vertices = VerticesCollection::make(&graph, "person")
            .unwrap()
            .with_filter_mode(mode);
        let ids = vertices
            .filter("age", &gt(prop("age"), lit(15)), None, None)
            .unwrap();
        assert_eq!(ids, vec![1, 2], "mode {}", mode);
    }
}

/// Test that descriptors survive a save/load cycle unchanged
#[test]
fn test_schema_round_trip() {
    let dir = TempDir::new().unwrap();
    let prefix = format!("{}/data/", dir.path().display());
    let graph = GraphInfo::new(
        "social",
        vec![person(1024)],
        vec![knows()],
        vec!["person".into()],
        prefix,
        InfoVersion::default(),
    )
    .unwrap();
    let path = dir.path().join("social.graph.yml");
    graph.save(&path).unwrap();

    assert!(dir.path().join("person.vertex.yml").exists());
    assert!(dir.path().join("person_knows_person.edge.yml").exists());
    let loaded = GraphInfo::load(&path).unwrap();
    assert_eq!(loaded, graph);
    assert_eq!(loaded.dump().unwrap(), graph.dump().unwrap());
}

#[test]
fn test_missing_descriptor() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        GraphInfo::load(dir.path().join("absent.graph.yml")),
        Err(GraphError::NotFound(_))
    ));
}

/// Test that appending across builders keeps ids contiguous
#[test]
fn test_append_resume() {
    let dir = TempDir::new().unwrap();

    let mut first = VerticesBuilder::new(person(2), dir.path(), 0).unwrap();
    add_people(&mut first, &[1, 2, 3]);
    first.dump().unwrap();
    // the partial chunk stays staged and is rewritten with new rows
    assert_eq!(add_people(&mut first, &[4]), vec![3]);
    first.dump().unwrap();
    assert!(first.is_empty());

    let mut second = VerticesBuilder::new(person(2), dir.path(), first.next_index()).unwrap();
    assert_eq!(add_people(&mut second, &[5, 6, 7]), vec![4, 5, 6]);
    second.dump().unwrap();

    let graph = save_and_load(&dir, vec![person(2)], vec![]);
    let vertices = VerticesCollection::make(&graph, "person").unwrap();
    assert_eq!(vertices.len(), 7);
    let mut it = vertices.begin();
    let mut seen = Vec::new();
    while !it.is_end() {
        assert_eq!(it.property::<i64>("id").unwrap(), it.id());
        seen.push(it.property::<i32>("age").unwrap());
        it.next();
    }
    assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);
}

/// Test that N ids with chunk size c occupy ceil(N/c) chunk files
#[test]
fn test_chunk_addressing() {
    let dir = TempDir::new().unwrap();
    let info = person(3);
    let mut builder = VerticesBuilder::new(info.clone(), dir.path(), 0).unwrap();
    add_people(&mut builder, &[0; 7]);
    builder.dump().unwrap();

    assert_eq!(chunk_count(7, 3), 3);
    let group_dir = dir.path().join(info.prefix()).join("id_age/");
    for chunk in 0..3 {
        assert!(group_dir.join(format!("chunk{}", chunk)).exists());
    }
    assert!(!group_dir.join("chunk3").exists());

    let addr = ChunkAddress::of(6, 3).unwrap();
    assert_eq!((addr.chunk_index, addr.offset), (2, 0));
    let store = ChunkStore::new(dir.path(), InfoVersion::default()).unwrap();
    assert_eq!(store.vertex_num(&info).unwrap(), 7);
}

/// Test edges and their properties written with mixed file types
#[test]
fn test_edges_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut builder = EdgesBuilder::new(knows(), dir.path(), 3, 3).unwrap();
    for (src, dst, days) in [(0, 1, 100), (2, 0, 200), (0, 2, 300)] {
        let mut edge = rust_graphar::Edge::new(src, dst);
        edge.add_property("since", Value::Date(days));
        builder.add_edge(edge).unwrap();
    }
    builder.dump().unwrap();

    let graph = save_and_load(&dir, vec![person(2)], vec![knows()]);
    let edges = rust_graphar::EdgesCollection::make(
        &graph,
        "person",
        "knows",
        "person",
        AdjListType::UnorderedByDest,
        None,
    )
    .unwrap();
    assert_eq!(edges.len(), 3);
    let it = edges.find_dst(2, &edges.begin()).unwrap();
    let edge = it.edge().unwrap();
    assert_eq!((edge.src(), edge.dst()), (0, 2));
    assert_eq!(edge.value("since"), Some(&Value::Date(300)));
}
