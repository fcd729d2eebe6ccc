use clap::{Parser, Subcommand};
use folio::article::{self, RenderOptions};
use folio::publish::{self, SitePaths};
use folio::{config, homepage, output};
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Build and publish a personal website")]
#[command(long_about = "\
Build and publish a personal website

The site root holds the homepage sources, the drafts being written and the
published articles:

  site/
  ├── site.toml           # Site config (optional)
  ├── articles.data       # Article summaries: title, date, description, url
  ├── projects.data       # Project summaries: title, url, description, image
  ├── next-thread-id      # Next comment-thread id
  ├── drafts/
  │   ├── _template/      # Underscore prefix = never listed or published
  │   └── my-post/
  │       ├── index.md    # Article source
  │       ├── index.html  # Layout with #PAGE_TITLE#, #ARTICLE_CONTENTS#, ...
  │       └── comments.js # Embed script with #THREAD_PAGE_URL#, #THREAD_IDENTIFIER#
  └── articles/           # Published articles, one folder each

Summary files are blocks of four lines separated by blank lines.

Run 'folio gen-config' to generate a documented site.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the homepage from the summary lists and gists
    Home {
        /// Output file [default: <root>/index.html]
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a Markdown article to an HTML fragment
    Article {
        /// Markdown file to render
        file: PathBuf,
        /// Write the fragment here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Render a draft into drafts/<DRAFT>/preview.html
    Preview { draft: String },
    /// Promote drafts/<DRAFT> into articles/<DRAFT>
    Publish { draft: String },
    /// List drafts available for publishing
    Drafts,
    /// Print a stock site.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Home { output: target } => {
            let site_config = config::load_config(&cli.root)?;
            let output_path = target.unwrap_or_else(|| cli.root.join("index.html"));
            let report = homepage::build_homepage(&cli.root, &output_path, &site_config)?;
            output::print_homepage_report(&report, &cli.root);
        }
        Command::Article { file, output: target } => {
            let markdown = std::fs::read_to_string(&file)?;
            let rendered = article::render_article(&markdown, &RenderOptions::default());
            match target {
                Some(path) => {
                    std::fs::write(&path, &rendered.html)?;
                    output::print_article_output(&rendered, Some(&path));
                }
                None => print!("{}", rendered.html),
            }
        }
        Command::Preview { draft } => {
            let site_config = config::load_config(&cli.root)?;
            let paths = SitePaths::new(&cli.root, &site_config.publish);
            let preview = publish::preview_draft(&paths, &draft)?;
            output::print_preview(&preview, &cli.root);
        }
        Command::Publish { draft } => {
            let site_config = config::load_config(&cli.root)?;
            let paths = SitePaths::new(&cli.root, &site_config.publish);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    println!("{}", output::format_publish_event(&event));
                }
            });
            let result = publish::publish(&paths, &site_config.publish, &draft, Some(tx));
            // The sender is gone once publish returns, so the printer drains and exits
            printer.join().ok();
            match result {
                Ok(report) => output::print_publish_report(&report, &cli.root),
                Err(e) => {
                    eprintln!("> Publishing {draft} failed: {e}");
                    return Err(e.into());
                }
            }
        }
        Command::Drafts => {
            let site_config = config::load_config(&cli.root)?;
            let paths = SitePaths::new(&cli.root, &site_config.publish);
            let drafts = publish::list_drafts(&paths.drafts_dir)?;
            output::print_drafts(&drafts);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
