use std::{env, fs, path::PathBuf};

use clap_complete::generate_to;
use clap_complete::shells::{Bash, Fish, Zsh};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("prismweave")
        .version("1.0.0")
        .author("PrismWeave Contributors")
        .about("Capture web pages as markdown")
        .subcommand(
            clap::Command::new("capture")
                .about("Capture a page and convert it to markdown")
                .arg(clap::arg!(<INPUT> "URL to fetch, local HTML file, or '-' for stdin"))
                .arg(
                    clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(clap::arg!(--commit "Commit the capture to the configured GitHub repository"))
                .arg(clap::arg!(--repo <SLUG> "Target repository (owner/repo)"))
                .arg(clap::arg!(--token <TOKEN> "GitHub token"))
                .arg(clap::arg!(--branch <BRANCH> "Target branch"))
                .arg(clap::arg!(--folder <DIR> "Repository folder for the committed file"))
                .arg(clap::arg!(--message <TEMPLATE> "Commit message template"))
                .arg(clap::arg!(--"source-url" <URL> "Source URL recorded in metadata"))
                .arg(clap::arg!(--"no-frontmatter" "Skip the metadata frontmatter block"))
                .arg(clap::arg!(--"no-images" "Strip images from the capture"))
                .arg(clap::arg!(--"no-links" "Unwrap links down to their text"))
                .arg(clap::arg!(--"no-clean" "Keep boilerplate regions"))
                .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
                .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
                .arg(clap::arg!(-v --verbose "Enable step-by-step progress output")),
        )
        .subcommand(
            clap::Command::new("bookmarklet")
                .about("Generate or decode personal bookmarklets")
                .subcommand(
                    clap::Command::new("generate")
                        .arg(clap::arg!(--token <TOKEN> "GitHub token to embed").required(true))
                        .arg(clap::arg!(--repo <SLUG> "Target repository (owner/repo)").required(true))
                        .arg(clap::arg!(--folder <DIR> "Repository folder captures land in"))
                        .arg(clap::arg!(--message <MESSAGE> "Fixed commit message"))
                        .arg(clap::arg!(-o --output <FILE> "Output file (default: stdout)")),
                )
                .subcommand(
                    clap::Command::new("decode")
                        .arg(clap::arg!(<INPUT> "Bookmarklet text, or a file containing it")),
                ),
        )
        .subcommand(
            clap::Command::new("settings")
                .about("Inspect or reset stored settings")
                .subcommand(clap::Command::new("show"))
                .subcommand(
                    clap::Command::new("set")
                        .arg(clap::arg!(<KEY> "Settings key"))
                        .arg(clap::arg!(<VALUE> "New value")),
                )
                .subcommand(clap::Command::new("reset"))
                .subcommand(clap::Command::new("path")),
        )
        .subcommand(
            clap::Command::new("articles")
                .about("Browse and edit the captured article library")
                .subcommand(clap::Command::new("list"))
                .subcommand(clap::Command::new("show").arg(clap::arg!(<ID> "Article id")))
                .subcommand(clap::Command::new("edit").arg(clap::arg!(<ID> "Article id")))
                .subcommand(clap::Command::new("delete").arg(clap::arg!(<ID> "Article id")))
                .subcommand(clap::Command::new("rebuild")),
        );

    generate_to(Bash, &mut cmd, "prismweave", &completions_dir).unwrap();
    generate_to(Zsh, &mut cmd, "prismweave", &completions_dir).unwrap();
    generate_to(Fish, &mut cmd, "prismweave", &completions_dir).unwrap();
}
