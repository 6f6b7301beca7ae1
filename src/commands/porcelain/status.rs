use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::Status;

impl Repository {
    pub async fn status(&mut self) -> anyhow::Result<()> {
        let staging = self.staging();
        let mut staging = staging.lock().await;
        staging.rehydrate()?;

        let status_info = Status::new(self).initialize(&staging)?;
        write!(self.writer(), "{status_info}")?;

        Ok(())
    }
}
