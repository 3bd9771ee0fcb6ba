/// Pushdown and row-wise filtering must agree on ids and on failure
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_graphar::expression::{and, eq, gt, gte, lit, lt, lte, neq, not, or, prop};
use rust_graphar::{
    DataType, Expression, FileType, FilterMode, GraphError, GraphInfo, InfoVersion, Property,
    PropertyGroup, Value, Vertex, VertexInfo, VerticesBuilder, VerticesCollection,
};
use std::sync::Arc;
use tempfile::TempDir;

const ROWS: usize = 60;

fn sensor(file_type: FileType) -> VertexInfo {
    let readings = PropertyGroup::new(
        vec![
            Property::simple("level", DataType::Int32, false),
            Property::simple("total", DataType::Int64, false),
            Property::new("score", DataType::Double, false, true, Default::default()),
        ],
        file_type,
        "",
    )
    .unwrap();
    let meta = PropertyGroup::new(
        vec![
            Property::simple("site", DataType::String, false),
            Property::simple("active", DataType::Bool, false),
        ],
        FileType::Parquet,
        "",
    )
    .unwrap();
    VertexInfo::new(
        "sensor",
        8,
        vec![readings, meta],
        vec![],
        "",
        InfoVersion::default(),
    )
    .unwrap()
}

/// `score` is null on every seventh row when `with_nulls` is set
fn setup(dir: &TempDir, file_type: FileType, with_nulls: bool) -> Arc<GraphInfo> {
    let mut rng = StdRng::seed_from_u64(7);
    let mut builder = VerticesBuilder::new(sensor(file_type), dir.path(), 0).unwrap();
    for i in 0..ROWS {
        let score = if with_nulls && i % 7 == 3 {
            Value::Null
        } else {
            Value::Float64(rng.gen_range(-1.0..1.0))
        };
        builder
            .add_vertex(
                Vertex::new()
                    .with_property("level", rng.gen_range(0..10_i32))
                    .with_property("total", rng.gen_range(-500..500_i64))
                    .with_property("score", score)
                    .with_property("site", ["north", "south", "east"][i % 3])
                    .with_property("active", rng.gen_bool(0.5)),
            )
            .unwrap();
    }
    builder.dump().unwrap();

    let prefix = format!("{}/", dir.path().display());
    Arc::new(
        GraphInfo::new(
            "sensors",
            vec![sensor(file_type)],
            vec![],
            vec![],
            prefix,
            InfoVersion::default(),
        )
        .unwrap(),
    )
}

fn run(
    graph: &Arc<GraphInfo>,
    mode: FilterMode,
    expr: &Expression,
    valid_chunks: Option<&[i64]>,
) -> Result<(Vec<i64>, Vec<i64>), GraphError> {
    let sensors = VerticesCollection::make(graph, "sensor")
        .unwrap()
        .with_filter_mode(mode);
    let mut chunks = Vec::new();
    let property = expr
        .referenced_properties()
        .into_iter()
        .next()
        .unwrap_or_else(|| "level".to_string());
    let ids = sensors.filter(&property, expr, valid_chunks, Some(&mut chunks))?;
    Ok((ids, chunks))
}

fn expressions() -> Vec<Expression> {
    vec![
        gt(prop("level"), lit(4)),
        lte(prop("level"), lit(4_i64)),
        lt(prop("total"), prop("level")),
        gte(prop("total"), lit(0.5)),
        eq(prop("site"), lit("south")),
        neq(prop("site"), prop("site")),
        eq(prop("active"), lit(true)),
        and(prop("active"), gt(prop("level"), lit(2))),
        or(eq(prop("site"), lit("east")), lt(prop("total"), lit(-100))),
        not(or(prop("active"), eq(prop("level"), lit(0)))),
        gt(prop("score"), lit(0)),
        and(lt(prop("level"), lit(0)), gt(prop("score"), lit(0))),
        or(gte(prop("level"), lit(0)), gt(prop("score"), lit(0))),
        or(gt(prop("level"), lit(5)), lt(prop("score"), prop("total"))),
        not(gt(prop("score"), lit(0.25_f32))),
    ]
}

fn assert_modes_agree(graph: &Arc<GraphInfo>, expr: &Expression, valid_chunks: Option<&[i64]>) {
    let pushdown = run(graph, FilterMode::Pushdown, expr, valid_chunks);
    let row_wise = run(graph, FilterMode::RowWise, expr, valid_chunks);
    match (&pushdown, &row_wise) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a, b, "{}", expr);
            assert!(a.0.windows(2).all(|w| w[0] < w[1]), "{} unsorted", expr);
        }
        (Err(GraphError::TypeError(_)), Err(GraphError::TypeError(_))) => {}
        _ => panic!("{}: {:?} vs {:?}", expr, pushdown, row_wise),
    }
}

/// Test agreement over parquet and csv chunks with nulls present
#[test]
fn test_modes_agree_with_nulls() {
    for file_type in [FileType::Parquet, FileType::Csv] {
        let dir = TempDir::new().unwrap();
        let graph = setup(&dir, file_type, true);
        for expr in expressions() {
            assert_modes_agree(&graph, &expr, None);
            assert_modes_agree(&graph, &expr, Some(&[1, 3, 5]));
        }
    }
}

/// Test agreement and failure placement when nulls are absent
#[test]
fn test_modes_agree_without_nulls() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir, FileType::Json, false);
    for expr in expressions() {
        assert_modes_agree(&graph, &expr, None);
        assert!(run(&graph, FilterMode::Pushdown, &expr, None).is_ok(), "{}", expr);
    }
}

#[test]
fn test_nulls_decided_by_other_operand() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir, FileType::Parquet, true);

    let never = and(lt(prop("level"), lit(0)), gt(prop("score"), lit(0)));
    let (ids, chunks) = run(&graph, FilterMode::Pushdown, &never, None).unwrap();
    assert!(ids.is_empty());
    assert!(chunks.is_empty());

    let always = or(gte(prop("level"), lit(0)), gt(prop("score"), lit(0)));
    let (ids, chunks) = run(&graph, FilterMode::RowWise, &always, None).unwrap();
    assert_eq!(ids.len(), ROWS);
    assert_eq!(chunks, (0..8).collect::<Vec<_>>());

    let err = run(&graph, FilterMode::Pushdown, &gt(prop("score"), lit(0)), None).unwrap_err();
    assert!(matches!(err, GraphError::TypeError(_)));
}

#[test]
fn test_static_errors_precede_io() {
    let dir = TempDir::new().unwrap();
    let graph = setup(&dir, FileType::Parquet, false);
    for mode in [FilterMode::Pushdown, FilterMode::RowWise] {
        assert!(matches!(
            run(&graph, mode, &eq(prop("site"), lit(3)), None),
            Err(GraphError::TypeError(_))
        ));
        assert!(matches!(
            run(&graph, mode, &eq(prop("altitude"), lit(3)), None),
            Err(GraphError::UnknownProperty(_))
        ));
        assert!(matches!(
            run(&graph, mode, &prop("level"), None),
            Err(GraphError::TypeError(_))
        ));
    }
}
