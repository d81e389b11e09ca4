//! Command-line interface for schemafixture

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use rand::rngs::StdRng;
#[cfg(feature = "cli")]
use rand::SeedableRng;
#[cfg(feature = "cli")]
use serde_json::Value;
#[cfg(feature = "cli")]
use std::borrow::Cow;
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use schemafixture::loaders::Loader;
#[cfg(feature = "cli")]
use schemafixture::registry::resolve_name;
#[cfg(feature = "cli")]
use schemafixture::{
    random_schema, GeneratorConfig, InvalidValueGenerator, Schema, SchemaKind, SchemaRegistry,
    ValidatorCompiler, ValueGenerator,
};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "schemafixture")]
#[command(
    author,
    version,
    about = "Schema-constrained fixture generation and validation",
    long_about = None
)]
struct Cli {
    /// Generator configuration file (JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate values that satisfy a schema
    Generate {
        /// Registered schema name, basic type, or path to a schema file
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// Directory of named schemas
        #[arg(short, long, value_name = "DIR")]
        schemas: Option<PathBuf>,

        /// Number of values to generate
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Generate values that violate a schema
    Invalid {
        /// Registered schema name, basic type, or path to a schema file
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// Directory of named schemas
        #[arg(short, long, value_name = "DIR")]
        schemas: Option<PathBuf>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Validate a JSON document against a schema
    Validate {
        /// Registered schema name, basic type, or path to a schema file
        #[arg(value_name = "SCHEMA")]
        schema: String,

        /// Path to the JSON file to validate
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Directory of named schemas
        #[arg(short, long, value_name = "DIR")]
        schemas: Option<PathBuf>,
    },

    /// Print a random object schema
    #[command(name = "random-schema")]
    RandomSchema {
        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Generate {
            schema,
            schemas,
            count,
            seed,
            pretty,
        } => cmd_generate(&config, &schema, schemas, count, seed, pretty),
        Commands::Invalid {
            schema,
            schemas,
            seed,
        } => cmd_invalid(&config, &schema, schemas, seed),
        Commands::Validate {
            schema,
            file,
            schemas,
        } => cmd_validate(&config, &schema, &file, schemas),
        Commands::RandomSchema { seed } => cmd_random_schema(seed),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> CliResult<GeneratorConfig> {
    match path {
        Some(path) => Ok(GeneratorConfig::from_file(path)?),
        None => Ok(GeneratorConfig::default()),
    }
}

#[cfg(feature = "cli")]
fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[cfg(feature = "cli")]
fn load_registry(config: &GeneratorConfig, dir: Option<PathBuf>) -> CliResult<SchemaRegistry> {
    let mut registry = SchemaRegistry::new();
    if let Some(dir) = dir {
        let loader = Loader::new().with_limits(config.limits.clone());
        let count = registry.load_directory_with(&loader, &dir)?;
        tracing::info!(count, dir = %dir.display(), "loaded schemas");
    }
    Ok(registry)
}

/// A schema file when `reference` names an existing path, otherwise a
/// registered name or basic type
#[cfg(feature = "cli")]
fn resolve_schema<'r>(
    config: &GeneratorConfig,
    registry: &'r SchemaRegistry,
    reference: &str,
) -> CliResult<Cow<'r, Schema>> {
    let path = Path::new(reference);
    if path.is_file() {
        let loader = Loader::new().with_limits(config.limits.clone());
        let text = loader.load(path)?;
        return Ok(Cow::Owned(Schema::from_json(&text)?));
    }
    Ok(resolve_name(Some(registry), reference)?)
}

#[cfg(feature = "cli")]
fn print_json(value: &Value, pretty: bool) -> CliResult<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_generate(
    config: &GeneratorConfig,
    reference: &str,
    schemas: Option<PathBuf>,
    count: usize,
    seed: Option<u64>,
    pretty: bool,
) -> CliResult<()> {
    let registry = load_registry(config, schemas)?;
    let schema = resolve_schema(config, &registry, reference)?;
    let generator = ValueGenerator::new()
        .with_registry(&registry)
        .with_config(config.clone());

    let mut rng = make_rng(seed);
    for _ in 0..count {
        let value = generator.generate(&schema, &mut rng)?;
        print_json(&value, pretty)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_invalid(
    config: &GeneratorConfig,
    reference: &str,
    schemas: Option<PathBuf>,
    seed: Option<u64>,
) -> CliResult<()> {
    let registry = load_registry(config, schemas)?;
    let schema = resolve_schema(config, &registry, reference)?;
    let generator = InvalidValueGenerator::new(
        ValueGenerator::new()
            .with_registry(&registry)
            .with_config(config.clone()),
    );

    let mut rng = make_rng(seed);
    for value in generator.generate(&schema, &mut rng)? {
        print_json(&value, false)?;
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_validate(
    config: &GeneratorConfig,
    reference: &str,
    file: &Path,
    schemas: Option<PathBuf>,
) -> CliResult<()> {
    let registry = load_registry(config, schemas)?;
    let schema = resolve_schema(config, &registry, reference)?;
    let document: Value = serde_json::from_str(&fs::read_to_string(file)?)?;
    let compiler = ValidatorCompiler::new().with_registry(&registry);

    let mut result = match compiler.compile(schema.name.as_deref().unwrap_or("value"), &schema)? {
        Some(validator) => validator.validate(&document).map(|_| ()),
        None => Ok(()),
    };
    if result.is_ok() {
        if let SchemaKind::Object(ref object) = schema.kind {
            result = compiler.compile_properties(object)?.validate_object(&document);
        }
    }

    match result {
        Ok(()) => {
            println!("✓ Document is valid");
            Ok(())
        }
        Err(error) => {
            println!("✗ Document is invalid");
            println!();
            println!("Errors:");
            println!("  - {}", error);
            std::process::exit(1);
        }
    }
}

#[cfg(feature = "cli")]
fn cmd_random_schema(seed: Option<u64>) -> CliResult<()> {
    let mut rng = make_rng(seed);
    let schema = random_schema(&mut rng)?;
    print_json(&schema.to_value(), true)
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
