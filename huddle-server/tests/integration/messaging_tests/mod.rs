mod test_message_broadcast;
