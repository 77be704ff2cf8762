use std::sync::Arc;

use cookie_bridge::transport::{Envelope, HostApiChannel};
use cookie_bridge::{BridgeConfig, CookieManagerBridge, HostApiDispatcher, InstanceManager, LogLevel};
use serde_json::{json, Value};

// Plays the remote caller: every step goes through the message transport.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = BridgeConfig::builder()
        .platform_version(21)
        .log_level(LogLevel::Debug)
        .build()?;
    cookie_bridge::logging::init(config.log_level);

    let instances = InstanceManager::new();
    let bridge = CookieManagerBridge::from_config(instances.clone(), &config);
    let dispatcher = HostApiDispatcher::new(Arc::new(bridge));

    let steps: [(HostApiChannel, Value); 6] = [
        (HostApiChannel::AttachInstance, json!([1])),
        (HostApiChannel::SetCookie, json!([1, "example.com", "a=b"])),
        (HostApiChannel::GetCookies, json!([1, "example.com"])),
        (HostApiChannel::RemoveAllCookies, json!([1])),
        (HostApiChannel::GetCookies, json!([1, "example.com"])),
        (HostApiChannel::GetCookies, json!([2, "example.com"])),
    ];

    for (channel, args) in steps {
        let bytes = dispatcher
            .handle_message(&channel.name(), args.to_string().as_bytes())
            .await?;

        match Envelope::decode(&bytes)? {
            Envelope::Result(value) => println!("{channel}({args}) -> {value}"),
            Envelope::Error(err) => println!("{channel}({args}) failed: [{}] {}", err.code, err.message),
        }
    }

    println!("{} instance(s) registered", instances.len());
    Ok(())
}
