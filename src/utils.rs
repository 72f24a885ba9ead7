//! 工具函数

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::error::{Result, SrsdError};

/// 把未指定主机的监听地址解析为真实可达地址
///
/// 输入形如 `host:port`。host 为空或为通配地址（`0.0.0.0`、`::`、
/// `[::]`）时替换为本机对外路由使用的 IP，端口保持不变；具体主机
/// 原样返回。
pub fn real_addr(addr: &str) -> Result<String> {
    let (host, port) = addr
        .rsplit_once(':')
        .ok_or_else(|| SrsdError::InvalidAddr(addr.to_string()))?;

    if !host.is_empty() && host != "0.0.0.0" && host != "::" && host != "[::]" {
        return Ok(addr.to_string());
    }

    let ip = local_ip()?;
    Ok(format!("{}:{}", ip, port))
}

/// 通过一次不发包的 UDP connect 取得对外路由使用的本机 IP
fn local_ip() -> Result<IpAddr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}
