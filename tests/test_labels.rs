/// Label filtering tests
use rust_graphar::{
    DataType, FileType, GraphError, GraphInfo, InfoVersion, Property, PropertyGroup, Vertex,
    VertexInfo, VerticesBuilder, VerticesCollection,
};
use std::sync::Arc;
use tempfile::TempDir;

fn tagged() -> VertexInfo {
    let group = PropertyGroup::new(
        vec![Property::simple("name", DataType::String, false)],
        FileType::Parquet,
        "",
    )
    .unwrap();
    VertexInfo::new(
        "item",
        2,
        vec![group],
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
        "",
        InfoVersion::default(),
    )
    .unwrap()
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// items: 0 {a,b,c}, 1 {a,d}, 2 {}, 3 {a,b}, 4 {b,c}
fn setup(dir: &TempDir) -> Arc<GraphInfo> {
    let mut builder = VerticesBuilder::new(tagged(), dir.path(), 0).unwrap();
    let sets: [&[&str]; 5] = [&["a", "b", "c"], &["a", "d"], &[], &["a", "b"], &["b", "c"]];
    for (i, set) in sets.iter().enumerate() {
        let mut vertex = Vertex::new().with_property("name", format!("item{}", i));
        for label in set.iter() {
            vertex.add_label(*label);
        }
        builder.add_vertex(vertex).unwrap();
    }
    builder.dump().unwrap();

    let prefix = format!("{}/", dir.path().display());
    Arc::new(
        GraphInfo::new("g", vec![tagged()], vec![], vec![], prefix, InfoVersion::default())
            .unwrap(),
    )
}

/// Test that a query matches vertices carrying every requested label
#[test]
fn test_subset_semantics() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir);
    let items = VerticesCollection::make(&graph, "item").unwrap();

    assert_eq!(
        items.filter_by_labels(&labels(&["a", "b"]), None, None).unwrap(),
        vec![0, 3]
    );
    assert_eq!(
        items.filter_by_labels(&labels(&["a", "d"]), None, None).unwrap(),
        vec![1]
    );
    assert_eq!(
        items.filter_by_labels(&labels(&["c", "a", "b"]), None, None).unwrap(),
        vec![0]
    );
    assert_eq!(
        items.filter_by_labels(&[], None, None).unwrap(),
        vec![0, 1, 2, 3, 4]
    );
}

#[test]
fn test_valid_chunks() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir);
    let items = VerticesCollection::make(&graph, "item").unwrap();

    let mut hit = Vec::new();
    let ids = items
        .filter_by_labels(&labels(&["b"]), Some(&[1, 2, 7]), Some(&mut hit))
        .unwrap();
    assert_eq!(ids, vec![3, 4]);
    assert_eq!(hit, vec![1, 2]);

    // chaining: only chunks that matched are rescanned
    let ids = items
        .filter_by_labels(&labels(&["c"]), Some(&hit), None)
        .unwrap();
    assert_eq!(ids, vec![4]);
}

#[test]
fn test_undeclared_label() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir);
    let items = VerticesCollection::make(&graph, "item").unwrap();
    assert!(matches!(
        items.filter_by_labels(&labels(&["a", "z"]), None, None),
        Err(GraphError::InvalidArgument(_))
    ));
    assert!(matches!(
        VerticesCollection::with_label(&graph, "item", "z"),
        Err(GraphError::InvalidArgument(_))
    ));
}

#[test]
fn test_label_collection_iteration() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir);
    let with_a = VerticesCollection::with_label(&graph, "item", "a").unwrap();
    assert_eq!(with_a.len(), 3);

    let mut it = with_a.begin();
    let mut names = Vec::new();
    while !it.is_end() {
        assert!(it.has_label("a").unwrap());
        names.push(it.property::<String>("name").unwrap());
        it.next();
    }
    assert_eq!(names, vec!["item0", "item1", "item3"]);

    let view = with_a.find(1).vertex().unwrap();
    assert_eq!(
        view.labels().iter().cloned().collect::<Vec<_>>(),
        labels(&["a", "d"])
    );
    assert!(with_a.find(2).is_end());
}
