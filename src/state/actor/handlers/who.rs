use super::super::RoomActor;
use crate::state::client::ClientRef;

impl RoomActor {
    pub(crate) fn handle_who(&self, client: &ClientRef) {
        let mut members: Vec<&ClientRef> = self.members.values().collect();
        members.sort_unstable_by(|a, b| a.nickname.cmp(&b.nickname));

        for member in members {
            let host = member.handle.host();
            let realname = format!("0 {}", member.realname);
            client.reply_nicknamed(&[
                self.name.as_str(),
                member.username.as_str(),
                host.as_str(),
                member.handle.hostname(),
                member.nickname.as_str(),
                "H",
                realname.as_str(),
            ]);
        }
        client.reply_nicknamed(&[self.name.as_str(), "End of /WHO list"]);
    }
}
