use smappee::api::Aggregation;
use smappee::SmappeeApi;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let username = std::env::var("SMAPPEE_USERNAME")?;
    let password = std::env::var("SMAPPEE_PASSWORD")?;

    let mut smappee = SmappeeApi::from_env_values()?;
    smappee.authenticate(&username, &password)?;

    let locations = smappee.get_service_locations()?;
    println!("locations: {:#}", locations);

    let Some(id) = locations["serviceLocations"][0]["serviceLocationId"].as_u64() else {
        anyhow::bail!("no service location on this account");
    };

    let now = chrono::Utc::now();
    let last_week = now - chrono::Duration::days(7);

    let consumption = smappee.get_consumption(id, last_week, now, Aggregation::DAILY)?;
    println!("consumption: {:#}", consumption);
    Ok(())
}
