use std::net::IpAddr;

use qrcode::{render::unicode, types::QrError, QrCode};

pub fn connect_url(ip: IpAddr, port: u16) -> String {
    format!("http://{}:{}", ip, port)
}

/// Renders `url` as a terminal QR code, two modules per character row.
///
/// Colors are inverted so the code scans on dark terminal backgrounds.
pub fn render_connect_qr(url: &str) -> Result<String, QrError> {
    let code = QrCode::new(url.as_bytes())?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .quiet_zone(true)
        .build())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn url_uses_lan_address_and_port() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));
        assert_eq!(connect_url(ip, 5000), "http://192.168.1.20:5000");
    }

    #[test]
    fn renders_a_rectangular_block() {
        let rendered = render_connect_qr("http://192.168.1.20:5000").unwrap();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines.len() > 10);
        let width = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == width));
        // Two modules per row, so the block is about twice as wide as tall.
        assert!(width >= lines.len() * 2 - 2 && width <= lines.len() * 2);
        assert!(rendered.contains(['█', '▀', '▄']));
    }

    #[test]
    fn different_urls_render_differently() {
        let a = render_connect_qr("http://192.168.1.20:5000").unwrap();
        let b = render_connect_qr("http://192.168.1.21:5000").unwrap();
        assert_ne!(a, b);
    }
}
