//! KB Status Agent - kbase 系统状态代理
//!
//! Usage:
//! - Normal mode: `kb-status-agent`
//! - With custom port: `kb-status-agent --port 19780`

use kb_status_agent::RuntimeConfig;

/// 解析命令行参数
fn parse_args() -> RuntimeConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = RuntimeConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" if i + 1 < args.len() => {
                config.port_override = args[i + 1].parse().ok();
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                i += 1;
            }
        }
    }

    config
}

fn print_help() {
    println!("KB Status Agent - kbase 系统状态代理");
    println!();
    println!("USAGE:");
    println!("    kb-status-agent [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --port <PORT>    Override the listening port");
    println!("    -h, --help       Print help information");
    println!();
    println!("EXAMPLES:");
    println!("    kb-status-agent                # Normal mode");
    println!("    kb-status-agent --port 19780   # Custom port");
}

fn main() {
    let config = parse_args();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    rt.block_on(async {
        kb_status_agent::init_and_run(config).await;
    });
}
