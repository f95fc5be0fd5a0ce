// src/main.rs
use clap::Parser;
use std::io;

use kube_transport::utils::logging::{FileLogger, Logger, MultiLogger, StderrLogger};
use kube_transport::{KubeCluster, ResolveOptions};

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the HTTP client options a kubeconfig resolves to", long_about = None)]
pub struct Args {
    /// Kubeconfig file; defaults to KUBECONFIG or ~/.kube/config
    #[arg(short, long)]
    pub kubeconfig: Option<String>,

    /// Context to resolve; defaults to the current-context
    #[arg(short, long)]
    pub context: Option<String>,

    /// Directory for materialized certificates and keys
    #[arg(short, long)]
    pub temp_dir: Option<String>,

    /// Use the pod's service account instead of a kubeconfig
    #[arg(long)]
    pub in_cluster: bool,

    #[arg(long)]
    pub log_file: Option<String>,

    #[arg(short, long)]
    pub debug: bool,
}

fn build_logger(args: &Args) -> io::Result<Box<dyn Logger>> {
    let stderr: Box<dyn Logger> = Box::new(StderrLogger::new(args.debug));
    match &args.log_file {
        Some(path) => {
            let file = FileLogger::new(shellexpand::tilde(path).to_string(), args.debug)?;
            Ok(Box::new(MultiLogger::new(vec![stderr, Box::new(file)])))
        }
        None => Ok(stderr),
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    let logger = build_logger(&args)?;

    let mut options = ResolveOptions::default();
    if let Some(dir) = &args.temp_dir {
        options = options.with_temp_dir(shellexpand::tilde(dir).to_string());
    }

    let context = args.context.as_deref();
    let cluster = if args.in_cluster {
        KubeCluster::in_cluster_configuration(&options, logger)?
    } else if let Some(path) = &args.kubeconfig {
        let path = shellexpand::tilde(path).to_string();
        KubeCluster::from_kubeconfig_file(path, context, &options, logger)?
    } else {
        KubeCluster::from_environment(context, &options, logger)?
    };

    let json = serde_json::to_string_pretty(&cluster.client_options()?)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    println!("{}", json);

    Ok(())
}
