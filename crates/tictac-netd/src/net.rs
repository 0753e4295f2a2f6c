pub mod framing;
pub mod inbound;
pub mod outbound;
pub mod rate_limit;
pub mod tcp;
