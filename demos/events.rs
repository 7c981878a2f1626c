use smappee::SmappeeApi;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let username = std::env::var("SMAPPEE_USERNAME")?;
    let password = std::env::var("SMAPPEE_PASSWORD")?;
    let service_location_id: u64 = std::env::var("SMAPPEE_SERVICE_LOCATION_ID")?.parse()?;
    let appliance_id: u64 = std::env::var("SMAPPEE_APPLIANCE_ID")?.parse()?;

    let mut smappee = SmappeeApi::from_env_values()?;
    smappee.authenticate(&username, &password)?;

    let info = smappee.get_service_location_info(service_location_id)?;
    println!("info: {:#}", info);

    let end = chrono::Utc::now();
    let start = end - chrono::Duration::days(1);

    let events = smappee.get_events(service_location_id, appliance_id, start, end, Some(20))?;
    println!("events: {:#}", events);
    Ok(())
}
