//! Print the default mesher configuration

use anyhow::Result;
use hexa_mesh::MesherConfig;

pub fn execute() -> Result<()> {
    println!("{}", MesherConfig::default().to_ron_string()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_back() {
        let text = MesherConfig::default().to_ron_string().unwrap();
        assert_eq!(MesherConfig::from_ron_str(&text).unwrap(), MesherConfig::default());
        execute().unwrap();
    }
}
