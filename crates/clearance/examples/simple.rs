use clearance::*;
use tracing_subscriber::EnvFilter;

const REGISTER: &str = "\
Số giấy phép,Tên khách hàng,Tần số phát,Tần số thu,Phương thức phát,Vĩ độ,Kinh độ,Tỉnh thành
GP-100/2022,Công ty Vận tải Đà Nẵng,142.0,146.0,11K0F3E,16°04'12N,108°13'12E,TP. Đà Nẵng
GP-200,Điện lực Hà Nội,142.5,,11K0F3E,21.0285,105.8542,Hà Nội
LD-01,Cứu hộ cứu nạn,143.5-143.525,,16K0F3E,,,Lưu động toàn quốc
";

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Frequency Clearance - Simple Example");
    println!("====================================");

    // A register path on the command line replaces the built-in sample
    let tables = embedded_tables()?;
    let registry = match std::env::args().nth(1) {
        Some(path) => StationRegistry::build(&read_records_from_path(path)?, &tables),
        None => StationRegistry::from_csv(REGISTER.as_bytes(), &tables),
    };
    println!("Stations loaded: {}", registry.len());
    println!("Reserved (nationwide) frequencies: {}", registry.reserved().len());

    let engine = ClearanceEngine::new(tables, registry);

    // A 20 m mast in Da Nang asking for two 12.5 kHz LAN channels
    let request = Request::new(
        Location::new(16.0544, 108.2022),
        Band::Vhf,
        Bandwidth::Khz12_5,
        NetworkMode::Lan,
    )
    .with_province("Đà Nẵng")
    .with_antenna_height(20.0)
    .with_scan(141.9, 142.6)
    .with_quantity(2);

    println!("\nScenario: {}", classify(&request).key);

    let ranked = engine.rank(&request);
    println!("\nUsable frequencies: {}", ranked.len());
    for r in ranked.iter().take(10) {
        println!(
            "  {:>3}. {:.4} MHz  reuse {}  {}{}",
            r.sequence,
            r.frequency,
            r.reuse_factor,
            r.license_list,
            if r.is_priority { "  [priority band]" } else { "" }
        );
    }

    println!("\nSuggested: {:?}", engine.suggest(&request));

    for freq in [142.0, 142.5, 143.5] {
        let verdict = engine.check_frequency(&request, freq);
        println!("\nCheck {freq:.4} MHz: {} - {}", verdict.status, verdict.message);
        for c in &verdict.conflicts {
            println!(
                "  ✗ {} ({}) {} at {:.4} MHz: {:.2} km < {:.1} km, {}",
                c.license_id,
                c.customer_name,
                c.class,
                c.station_frequency,
                c.distance_km,
                c.required_km,
                c.location
            );
        }
    }

    let bad = engine.scan_bad_frequencies(&request);
    println!("\nBad-frequency scan: {} conflicts", bad.len());
    for c in &bad {
        println!(
            "  {:.4} MHz blocked by {} ({})",
            c.candidate_frequency, c.license_id, c.class
        );
    }

    Ok(())
}
