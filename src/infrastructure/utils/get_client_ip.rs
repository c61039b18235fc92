use actix_web::HttpRequest;

/// Throttle identifier for the request's client.
///
/// With `trust_x_forwarded_for` the first hop of `X-Forwarded-For` wins, which
/// is only safe behind a proxy that overwrites the header.
pub fn get_client_ip(req: &HttpRequest, trust_x_forwarded_for: bool) -> String {
    if trust_x_forwarded_for {
        let forwarded = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
