// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 演示服务器
//!
//! 基于 Tokio 运行时的多线程 TCP 服务器，把每个 HTTP 请求交给组件树处理：
//! - 读取原始请求字节并整理成 `Globals`
//! - 构造顶层 `Request` 上下文，由 `Bootstrap` 从根组件开始分发
//! - 把最终的 `HttpResponse` 序列化后写回连接
//!
//! 组件树本身只在同步的 `serve` 中存活，不会跨越 `.await`。

mod demo;

use log::{debug, error, info, warn, LevelFilter};
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
};
use tokio::{
    io::AsyncWriteExt,
    net::{TcpListener, TcpStream},
    runtime::Builder,
};

use std::{
    net::{Ipv4Addr, SocketAddrV4},
    process,
    sync::Arc,
    time::Instant,
};

use webtree::{Bootstrap, Config, Context, Globals, HttpResponse, Registry, Request};

/// # 程序入口点
///
/// 初始化日志、加载配置、构建异步运行时并启动主事件循环。
fn main() {
    // 1. 初始化日志系统：优先使用外部 YAML 配置，失败时退回到控制台输出
    init_logger();

    // 2. 环境配置加载：从 TOML 文件读取运行参数，href_base 不合法时直接退出
    let config = match Config::from_toml("config/development.toml") {
        Ok(config) => config,
        Err(e) => {
            error!("无法载入配置文件：{}", e);
            process::exit(1);
        }
    };
    info!("配置文件已载入");

    // 3. 异步运行时定制：根据配置文件动态分配工作线程数
    let runtime = match Builder::new_multi_thread()
        .worker_threads(config.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("无法创建异步运行时：{}", e);
            process::exit(1);
        }
    };

    runtime.block_on(run(config));
}

fn init_logger() {
    if let Err(e) = log4rs::init_file("config/log4rs.yaml", Default::default()) {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(
                "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}",
            )))
            .build();
        let fallback = log4rs::Config::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info));
        match fallback {
            Ok(fallback) => {
                if log4rs::init_config(fallback).is_ok() {
                    warn!("无法载入 config/log4rs.yaml（{}），改用控制台日志", e);
                }
            }
            Err(errors) => eprintln!("无法初始化日志系统：{}", errors),
        }
    }
}

async fn run(config: Config) {
    // 组件注册表与配置在所有连接之间只读共享
    let registry = Arc::new(demo::registry());
    let config = Arc::new(config);

    // 网络层初始化：支持全地址监听 (0.0.0.0) 或本地回环监听 (127.0.0.1)
    let port: u16 = config.port();
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}:{}上监听Socket连接", address, port);
    let socket = SocketAddrV4::new(address, port);

    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            return;
        }
    };
    info!("端口{}绑定完成，根组件：{}", port, config.root_component());

    let mut id: u128 = 0;

    // 主事件循环：持续接收新连接，收到 Ctrl-C 时退出
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = tokio::signal::ctrl_c() => {
                info!("接收到停机信号，正在退出...");
                break;
            }
        };
        let (mut stream, addr) = match accepted {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!("接受连接失败：{}", e);
                continue;
            }
        };
        debug!("[ID{}]TCP连接已建立：{}", id, addr);

        let registry = Arc::clone(&registry);
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            handle_connection(&mut stream, id, &registry, &config).await;
        });
        id += 1;
    }
}

/// # 连接处理器
///
/// 读取一次请求，分发，并写回响应。
async fn handle_connection(stream: &mut TcpStream, id: u128, registry: &Registry, config: &Config) {
    let mut buffer = vec![0; 8192];

    if let Err(e) = stream.readable().await {
        error!("[ID{}]等待TCPStream可读时遇到错误: {}", id, e);
        return;
    }
    let n = match stream.try_read(&mut buffer) {
        Ok(0) => return,
        Ok(n) => n,
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
    };
    buffer.truncate(n);
    debug!("[ID{}]HTTP请求接收完毕，{}字节", id, n);

    let start_time = Instant::now();
    let response_bytes = serve(&buffer, id, registry, config);
    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    if let Err(e) = stream.write_all(&response_bytes).await {
        error!("[ID{}]发送响应失败: {}", id, e);
        return;
    }
    let _ = stream.flush().await;
}

/// 同步地完成一次分发，返回序列化后的响应
fn serve(buffer: &[u8], id: u128, registry: &Registry, config: &Config) -> Vec<u8> {
    let globals = match Globals::try_from(buffer, id) {
        Ok(globals) => globals,
        Err(e) => {
            warn!("[ID{}]解析HTTP请求失败: {}", id, e);
            return HttpResponse::from_status_code(400, Some(&e.to_string())).as_bytes();
        }
    };

    let mut builder = Request::builder(globals);
    if let Some(base) = config.href_base() {
        builder = builder.href_base(base);
    }
    let request = match builder.build() {
        Ok(request) => request,
        Err(e) => {
            error!("[ID{}]无法构造请求上下文: {}", id, e);
            return HttpResponse::from_status_code(500, None).as_bytes();
        }
    };

    let response = Bootstrap::new(registry)
        .debug(config.debug())
        .log_dispatch(config.log_dispatch())
        .id(id)
        .run(config.root_component(), &request);

    info!(
        "[ID{}] {}, {}, {}, {}",
        id,
        request.method().to_uppercase(),
        request.server().request_uri,
        response.status(),
        response.information(),
    );
    response.as_bytes()
}
