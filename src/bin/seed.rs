//! 演示数据生成：
//! - 创建若干供应商，每个供应商 2-6 个商品
//! - 商品随机挂上分类（不存在时自动创建）
//! - 每个供应商 / 商品的图片都经由 `ingest_path` 入库（默认使用生成的 PNG 样图）

use std::env;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use inventory_backend::config::AppConfig;
use inventory_backend::features::product::models::ProductInput;
use inventory_backend::features::supplier::models::SupplierInput;
use inventory_backend::startup::run_startup_checks;
use inventory_backend::storage::{InventoryStorage, new_id};
use inventory_backend::{Collection, ImageService};

const DEFAULT_SUPPLIERS: usize = 8;
const DEFAULT_RNG_SEED: u64 = 20260101;

const SUPPLIER_NAMES: [&str; 10] = [
    "Acme Hardware",
    "Northwind Traders",
    "Blue Harbor Supply",
    "Summit Tools",
    "Greenleaf Garden",
    "Ironclad Fasteners",
    "Brightline Electric",
    "Cedar & Pine Lumber",
    "Atlas Plumbing",
    "Redstone Paints",
];

const PRODUCT_NOUNS: [&str; 12] = [
    "Hammer", "Wrench", "Drill", "Saw", "Screwdriver", "Pliers", "Tape Measure", "Level",
    "Sander", "Ladder", "Flashlight", "Toolbox",
];

const PRODUCT_ADJECTIVES: [&str; 8] = [
    "Heavy Duty", "Compact", "Cordless", "Pro", "Classic", "Precision", "Folding", "Magnetic",
];

const CATEGORY_NAMES: [&str; 6] = [
    "hand tools",
    "power tools",
    "garden",
    "electrical",
    "plumbing",
    "safety",
];

#[derive(Debug, Clone)]
struct Args {
    help: bool,
    suppliers: usize,
    image: Option<PathBuf>,
    rng_seed: u64,
}

impl Args {
    fn parse(raw: Vec<String>) -> Result<Self, String> {
        let mut args = Args {
            help: false,
            suppliers: DEFAULT_SUPPLIERS,
            image: None,
            rng_seed: DEFAULT_RNG_SEED,
        };
        let mut it = raw.into_iter();
        while let Some(flag) = it.next() {
            match flag.as_str() {
                "-h" | "--help" => args.help = true,
                "--suppliers" => {
                    let v = it.next().ok_or("--suppliers 需要一个数字")?;
                    args.suppliers = v
                        .parse()
                        .map_err(|_| format!("--suppliers 不是合法数字: {v}"))?;
                }
                "--image" => {
                    let v = it.next().ok_or("--image 需要一个文件路径")?;
                    args.image = Some(PathBuf::from(v));
                }
                "--seed" => {
                    let v = it.next().ok_or("--seed 需要一个数字")?;
                    args.rng_seed = v.parse().map_err(|_| format!("--seed 不是合法数字: {v}"))?;
                }
                other => return Err(format!("未知参数: {other}")),
            }
        }
        Ok(args)
    }
}

fn print_help() {
    println!(
        "用法: seed [--suppliers N] [--image PATH] [--seed N]\n\n\
         --suppliers N   生成的供应商数量（默认 {DEFAULT_SUPPLIERS}）\n\
         --image PATH    作为样图的图片文件（默认生成 PNG 样图）\n\
         --seed N        随机种子（默认 {DEFAULT_RNG_SEED}）\n\n\
         配置文件与环境变量同服务端（config.toml / APP_*）。"
    );
}

/// 生成一张双色渐变 PNG 样图，返回文件路径
fn write_fixture_png(dir: &Path, name: &str, base: [u8; 3]) -> Result<PathBuf, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let img = RgbImage::from_fn(200, 200, |x, y| {
        Rgb([
            base[0].saturating_add((x / 4) as u8),
            base[1].saturating_add((y / 4) as u8),
            base[2],
        ])
    });
    let path = dir.join(format!("{name}.png"));
    img.save_with_format(&path, ImageFormat::Png)?;
    Ok(path)
}

/// 在阻塞线程池中执行 `ingest_path`
async fn ingest_fixture(
    images: &ImageService,
    source: &Path,
    collection: Collection,
) -> Result<String, Box<dyn std::error::Error>> {
    let svc = images.clone();
    let source = source.to_path_buf();
    let path =
        tokio::task::spawn_blocking(move || svc.ingest_path(&source, collection, None)).await??;
    Ok(path)
}

async fn seed(
    storage: &InventoryStorage,
    images: &ImageService,
    args: &Args,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(args.rng_seed);
    let fixture_dir = env::temp_dir().join(format!("inventory_seed_{}", new_id()));

    let mut products_created = 0usize;
    for i in 0..args.suppliers {
        let base_name = SUPPLIER_NAMES[i % SUPPLIER_NAMES.len()];
        let name = if i < SUPPLIER_NAMES.len() {
            base_name.to_string()
        } else {
            format!("{base_name} #{}", i / SUPPLIER_NAMES.len() + 1)
        };
        let slug: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        let source = match &args.image {
            Some(p) => p.clone(),
            None => {
                let base = [rng.gen_range(0..160), rng.gen_range(0..160), rng.gen_range(0..255)];
                write_fixture_png(&fixture_dir, &format!("supplier_{i}"), base)?
            }
        };
        let image_path = ingest_fixture(images, &source, Collection::Suppliers).await?;

        let supplier_id = new_id();
        let input = SupplierInput {
            name: name.clone(),
            contact_name: Some(format!("Contact {}", i + 1)),
            email: Some(format!("sales+{i}@{slug}.test")),
            phone: Some(format!("+1 555 01{:02}", i % 100)),
            address: Some(format!("{} Market Street", 100 + i)),
        };
        storage
            .insert_supplier(&supplier_id, &input, Some(&image_path))
            .await?;

        let count = rng.gen_range(2..=6);
        for j in 0..count {
            let adjective = PRODUCT_ADJECTIVES.choose(&mut rng).copied().unwrap_or("Classic");
            let noun = PRODUCT_NOUNS.choose(&mut rng).copied().unwrap_or("Hammer");
            let category_count = rng.gen_range(0..=2);
            let categories: Vec<String> = CATEGORY_NAMES
                .choose_multiple(&mut rng, category_count)
                .map(|c| c.to_string())
                .collect();

            let source = match &args.image {
                Some(p) => p.clone(),
                None => {
                    let base = [rng.gen_range(0..200), rng.gen_range(0..200), rng.gen_range(0..200)];
                    write_fixture_png(&fixture_dir, &format!("product_{i}_{j}"), base)?
                }
            };
            let image_path = ingest_fixture(images, &source, Collection::Products).await?;

            let product = ProductInput {
                supplier_id: supplier_id.clone(),
                name: format!("{adjective} {noun}"),
                sku: format!("SKU-{:03}-{:02}", i + 1, j + 1),
                description: Some(format!("{adjective} {noun} supplied by {name}")),
                price: (rng.gen_range(199..=49_999) as f64) / 100.0,
                stock: rng.gen_range(0..=150),
                categories,
            };
            storage
                .insert_product(&new_id(), &product, Some(&image_path))
                .await?;
            products_created += 1;
        }
        tracing::info!(supplier = %name, products = count, "供应商数据已生成");
    }

    let _ = std::fs::remove_dir_all(&fixture_dir);
    Ok((args.suppliers, products_created))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_backend=info,seed=info".into()),
        )
        .try_init();

    let args = Args::parse(env::args().skip(1).collect())?;
    if args.help {
        print_help();
        return Ok(());
    }

    let config = AppConfig::load()?;
    let storage = run_startup_checks(&config).await?;
    let images = ImageService::from_config(&config.images);

    let (suppliers, products) = seed(&storage, &images, &args).await?;
    println!("已生成 {suppliers} 个供应商、{products} 个商品");
    Ok(())
}
