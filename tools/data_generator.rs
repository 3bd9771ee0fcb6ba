use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_graphar::{
    init_logging, AdjListType, AdjacentList, DataType, Edge, EdgeInfo, EdgesBuilder, EngineConfig,
    FileType, GraphInfo, InfoVersion, Property, PropertyGroup, Vertex, VertexInfo,
    VerticesBuilder,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, ValueEnum)]
enum GraphType {
    Uniform,
    PowerLaw,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Parquet,
    Csv,
    Json,
}

impl From<Format> for FileType {
    fn from(format: Format) -> Self {
        match format {
            Format::Parquet => FileType::Parquet,
            Format::Csv => FileType::Csv,
            Format::Json => FileType::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "data_generator")]
#[command(about = "Generate chunked graph datasets for benchmarking", long_about = None)]
struct Args {
    /// Type of graph to generate
    #[arg(short, long, value_enum)]
    graph_type: GraphType,

    /// Number of vertices
    #[arg(short = 'n', long, default_value_t = 1000)]
    vertices: i64,

    /// Average out-degree
    #[arg(short = 'd', long, default_value_t = 10)]
    avg_degree: usize,

    /// Vertex chunk size
    #[arg(long, default_value_t = 1024)]
    chunk_size: i64,

    /// Edge chunk size
    #[arg(long, default_value_t = 4096)]
    edge_chunk_size: i64,

    /// Chunk file format
    #[arg(short, long, value_enum, default_value = "parquet")]
    format: Format,

    /// Output directory (descriptors and chunks)
    #[arg(short, long)]
    output: PathBuf,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const CITIES: [&str; 6] = ["NYC", "LA", "Chicago", "Houston", "Phoenix", "Dallas"];

fn schema(args: &Args) -> Result<(VertexInfo, EdgeInfo)> {
    let file_type = FileType::from(args.format);
    let person = VertexInfo::new(
        "person",
        args.chunk_size,
        vec![
            PropertyGroup::new(
                vec![
                    Property::simple("id", DataType::Int64, true),
                    Property::simple("age", DataType::Int32, false),
                ],
                file_type,
                "",
            )?,
            PropertyGroup::new(
                vec![Property::simple("city", DataType::String, false)],
                file_type,
                "",
            )?,
        ],
        vec!["adult".into(), "senior".into()],
        "",
        InfoVersion::default(),
    )?;
    let knows = EdgeInfo::new(
        "person",
        "knows",
        "person",
        args.edge_chunk_size,
        args.chunk_size,
        args.chunk_size,
        true,
        vec![
            AdjacentList::new(AdjListType::OrderedBySource, file_type, ""),
            AdjacentList::new(AdjListType::OrderedByDest, file_type, ""),
        ],
        vec![PropertyGroup::new(
            vec![Property::simple("weight", DataType::Double, false)],
            file_type,
            "",
        )?],
        "",
        InfoVersion::default(),
    )?;
    Ok((person, knows))
}

struct GraphGenerator {
    rng: StdRng,
}

impl GraphGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn person(&mut self, id: i64) -> Vertex {
        let age = self.rng.gen_range(5..90);
        let mut vertex = Vertex::new()
            .with_property("id", id)
            .with_property("age", age)
            .with_property("city", CITIES[self.rng.gen_range(0..CITIES.len())]);
        if age >= 18 {
            vertex.add_label("adult");
        }
        if age >= 65 {
            vertex.add_label("senior");
        }
        vertex
    }

    /// Uniform random pairs without duplicates or self loops
    fn uniform_edges(&mut self, n: i64, avg_degree: usize) -> Vec<(i64, i64)> {
        let target = n as usize * avg_degree;
        let mut seen = BTreeSet::new();
        let mut attempts = 0;
        while seen.len() < target && attempts < target * 10 {
            let src = self.rng.gen_range(0..n);
            let dst = self.rng.gen_range(0..n);
            if src != dst {
                seen.insert((src, dst));
            }
            attempts += 1;
        }
        seen.into_iter().collect()
    }

    /// Barabási-Albert style preferential attachment
    fn power_law_edges(&mut self, n: i64, m: usize) -> Vec<(i64, i64)> {
        let mut edges = Vec::new();
        // every endpoint appears once per incident edge
        let mut endpoints: Vec<i64> = Vec::new();
        let seed = (m as i64 + 1).min(n);
        for i in 0..seed {
            for j in (i + 1)..seed {
                edges.push((i, j));
                endpoints.extend([i, j]);
            }
        }
        for node in seed..n {
            let mut targets = BTreeSet::new();
            while targets.len() < m.min(node as usize) {
                let pick = if endpoints.is_empty() {
                    self.rng.gen_range(0..node)
                } else {
                    endpoints[self.rng.gen_range(0..endpoints.len())]
                };
                targets.insert(pick);
            }
            for target in targets {
                edges.push((node, target));
                endpoints.extend([node, target]);
            }
        }
        edges
    }
}

fn main() -> Result<()> {
    let config = EngineConfig::from_env()?;
    init_logging(&config.logging)?;
    let args = Args::parse();

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let (person, knows) = schema(&args)?;
    let mut generator = GraphGenerator::new(args.seed);

    let mut vertices = VerticesBuilder::from_config(person.clone(), &args.output, 0, &config.builder)?;
    for id in 0..args.vertices {
        vertices.add_vertex(generator.person(id))?;
    }
    vertices.dump()?;

    let pairs = match args.graph_type {
        GraphType::Uniform => generator.uniform_edges(args.vertices, args.avg_degree),
        GraphType::PowerLaw => generator.power_law_edges(args.vertices, args.avg_degree),
    };
    let mut edges = EdgesBuilder::from_config(
        knows.clone(),
        &args.output,
        args.vertices,
        args.vertices,
        &config.builder,
    )?;
    for (src, dst) in &pairs {
        let weight: f64 = generator.rng.gen_range(0.0..1.0);
        edges.add_edge(Edge::new(*src, *dst).with_property("weight", weight))?;
    }
    edges.dump()?;

    let prefix = format!("{}/", args.output.canonicalize()?.display());
    let graph = GraphInfo::new(
        "generated",
        vec![person],
        vec![knows],
        vec![],
        prefix,
        InfoVersion::default(),
    )?;
    let descriptor = args.output.join("generated.graph.yml");
    graph.save(&descriptor)?;

    info!(
        vertices = args.vertices,
        edges = pairs.len(),
        descriptor = %descriptor.display(),
        "dataset generated"
    );
    Ok(())
}
